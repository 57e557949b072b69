//! Typing indicators: inbound entries with expiry, outbound debounce.

use std::time::Duration;

use huddle_chats::PresenceEntry;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
struct TypingEntry {
    user: PresenceEntry,
    expires_at: Instant,
}

/// Users currently composing in the active channel.
///
/// Entries disappear on an explicit stop or once their deadline passes
/// without a fresh start signal.
#[derive(Debug, Clone)]
pub struct TypingTracker {
    entries: Vec<TypingEntry>,
    expiry: Duration,
}

impl TypingTracker {
    pub fn new(expiry: Duration) -> Self {
        Self {
            entries: Vec::new(),
            expiry,
        }
    }

    /// Add the user if absent; an existing entry only has its deadline pushed
    /// back. Returns whether the user was newly added.
    pub fn start(&mut self, user: PresenceEntry, now: Instant) -> bool {
        let expires_at = now + self.expiry;
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.user.user_id == user.user_id)
        {
            entry.expires_at = expires_at;
            return false;
        }
        self.entries.push(TypingEntry { user, expires_at });
        true
    }

    pub fn stop(&mut self, user_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.user.user_id != user_id);
        self.entries.len() != before
    }

    /// Drop every entry whose deadline is at or before `now`
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.expires_at > now);
        before - self.entries.len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|entry| entry.expires_at).min()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn users(&self) -> Vec<PresenceEntry> {
        self.entries.iter().map(|entry| entry.user.clone()).collect()
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.entries.iter().any(|entry| entry.user.user_id == user_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outbound stop-typing debounce.
///
/// Each keystroke re-arms the quiet period; when it elapses the channel that
/// was being typed in is due a stop signal.
#[derive(Debug, Clone)]
pub struct TypingDebounce {
    quiet_period: Duration,
    pending: Option<(String, Instant)>,
}

impl TypingDebounce {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: None,
        }
    }

    /// Arm for `channel_id`. Returns a channel that still owes a stop signal
    /// when typing moved to another channel.
    pub fn keystroke(&mut self, channel_id: &str, now: Instant) -> Option<String> {
        let previous = self
            .pending
            .take()
            .map(|(channel, _)| channel)
            .filter(|channel| channel != channel_id);
        self.pending = Some((channel_id.to_string(), now + self.quiet_period));
        previous
    }

    /// Take the channel whose quiet period has elapsed
    pub fn due(&mut self, now: Instant) -> Option<String> {
        if self.deadline()? <= now {
            self.cancel()
        } else {
            None
        }
    }

    /// Disarm, returning the channel that was pending
    pub fn cancel(&mut self) -> Option<String> {
        self.pending.take().map(|(channel, _)| channel)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }
}
