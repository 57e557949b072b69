use std::time::Duration;

use huddle_config::RealtimeConfig;

/// Exponential backoff bounded by a delay cap and an attempt budget.
///
/// ```
/// use std::time::Duration;
/// use huddle_gateway::ReconnectPolicy;
///
/// let policy = ReconnectPolicy::new(Duration::from_secs(1), Duration::from_secs(5), 5);
/// assert_eq!(policy.delay_for(1), Some(Duration::from_secs(1)));
/// assert_eq!(policy.delay_for(4), Some(Duration::from_secs(5)));
/// assert_eq!(policy.delay_for(6), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    initial: Duration,
    max: Duration,
    attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(initial: Duration, max: Duration, attempts: u32) -> Self {
        Self {
            initial,
            max: max.max(initial),
            attempts,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Delay before reconnect attempt `attempt` (1-based), or `None` once the
    /// budget is spent.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.attempts {
            return None;
        }
        let factor = 2u32.saturating_pow(attempt - 1);
        Some(self.initial.saturating_mul(factor).min(self.max))
    }
}

impl From<&RealtimeConfig> for ReconnectPolicy {
    fn from(config: &RealtimeConfig) -> Self {
        Self::new(
            Duration::from_millis(config.reconnect_delay_ms),
            Duration::from_millis(config.reconnect_delay_max_ms),
            config.reconnect_attempts,
        )
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from(&RealtimeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_doubles_then_caps() {
        let policy = ReconnectPolicy::default();
        let delays: Vec<_> = (1..=5).filter_map(|n| policy.delay_for(n)).collect();

        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(5),
                Duration::from_secs(5),
            ]
        );
        assert_eq!(policy.delay_for(6), None);
    }

    #[test]
    fn zero_attempts_never_reconnects() {
        let policy = ReconnectPolicy::new(Duration::from_millis(10), Duration::from_millis(50), 0);
        assert_eq!(policy.delay_for(1), None);
    }

    #[test]
    fn cap_below_initial_is_raised() {
        let policy = ReconnectPolicy::new(Duration::from_secs(2), Duration::from_secs(1), 3);
        assert_eq!(policy.delay_for(1), Some(Duration::from_secs(2)));
        assert_eq!(policy.delay_for(3), Some(Duration::from_secs(2)));
    }

    #[test]
    fn large_attempt_numbers_do_not_overflow() {
        let policy = ReconnectPolicy::new(Duration::from_secs(1), Duration::from_secs(5), u32::MAX);
        assert_eq!(policy.delay_for(200), Some(Duration::from_secs(5)));
    }
}
