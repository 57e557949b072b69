use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "huddle.toml",
    "config/huddle.toml",
    "crates/config/huddle.toml",
    "../huddle.toml",
    "../config/huddle.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub realtime: RealtimeConfig,
    pub cache: CacheConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "ApiConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl ApiConfig {
    const fn default_request_timeout() -> u64 {
        30
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

/// Live stream endpoint and reconnection policy.
///
/// ```
/// use huddle_config::RealtimeConfig;
///
/// let realtime = RealtimeConfig::default();
/// assert_eq!(realtime.reconnect_delay_ms, 1_000);
/// assert_eq!(realtime.reconnect_delay_max_ms, 5_000);
/// assert_eq!(realtime.reconnect_attempts, 5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    pub url: String,
    #[serde(default = "RealtimeConfig::default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
    #[serde(default = "RealtimeConfig::default_reconnect_delay_max")]
    pub reconnect_delay_max_ms: u64,
    #[serde(default = "RealtimeConfig::default_reconnect_attempts")]
    pub reconnect_attempts: u32,
}

impl RealtimeConfig {
    const fn default_reconnect_delay() -> u64 {
        1_000
    }

    const fn default_reconnect_delay_max() -> u64 {
        5_000
    }

    const fn default_reconnect_attempts() -> u32 {
        5
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:5000/ws".to_string(),
            reconnect_delay_ms: Self::default_reconnect_delay(),
            reconnect_delay_max_ms: Self::default_reconnect_delay_max(),
            reconnect_attempts: Self::default_reconnect_attempts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// `sqlite://<path>` for a durable cache, or `memory` for a process-local one.
    pub url: String,
    pub max_connections: u32,
}

impl CacheConfig {
    pub fn is_memory(&self) -> bool {
        self.url == "memory"
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://huddle-cache.db".to_string(),
            max_connections: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Idle time after the last keystroke before a stop-typing signal is sent.
    #[serde(default = "SyncConfig::default_typing_stop_after")]
    pub typing_stop_after_ms: u64,
    /// How long a remote typing indicator survives without a refresh.
    #[serde(default = "SyncConfig::default_typing_expiry")]
    pub typing_expiry_ms: u64,
    #[serde(default = "SyncConfig::default_true")]
    pub auto_mark_read: bool,
    #[serde(default = "SyncConfig::default_true")]
    pub dedupe_by_id: bool,
}

impl SyncConfig {
    const fn default_typing_stop_after() -> u64 {
        3_000
    }

    const fn default_typing_expiry() -> u64 {
        6_000
    }

    const fn default_true() -> bool {
        true
    }

    pub fn typing_stop_after(&self) -> Duration {
        Duration::from_millis(self.typing_stop_after_ms)
    }

    pub fn typing_expiry(&self) -> Duration {
        Duration::from_millis(self.typing_expiry_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            typing_stop_after_ms: Self::default_typing_stop_after(),
            typing_expiry_ms: Self::default_typing_expiry(),
            auto_mark_read: true,
            dedupe_by_id: true,
        }
    }
}

fn as_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Load the client configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use huddle_config::load;
///
/// std::env::remove_var("HUDDLE_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.api.base_url.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder()
        .set_default("api.base_url", defaults.api.base_url.clone())?
        .set_default(
            "api.request_timeout_seconds",
            as_i64(defaults.api.request_timeout_seconds),
        )?
        .set_default("realtime.url", defaults.realtime.url.clone())?
        .set_default(
            "realtime.reconnect_delay_ms",
            as_i64(defaults.realtime.reconnect_delay_ms),
        )?
        .set_default(
            "realtime.reconnect_delay_max_ms",
            as_i64(defaults.realtime.reconnect_delay_max_ms),
        )?
        .set_default(
            "realtime.reconnect_attempts",
            i64::from(defaults.realtime.reconnect_attempts),
        )?
        .set_default("cache.url", defaults.cache.url.clone())?
        .set_default(
            "cache.max_connections",
            i64::from(defaults.cache.max_connections),
        )?
        .set_default(
            "sync.typing_stop_after_ms",
            as_i64(defaults.sync.typing_stop_after_ms),
        )?
        .set_default("sync.typing_expiry_ms", as_i64(defaults.sync.typing_expiry_ms))?
        .set_default("sync.auto_mark_read", defaults.sync.auto_mark_read)?
        .set_default("sync.dedupe_by_id", defaults.sync.dedupe_by_id)?;

    let environment_overrides = config::Environment::with_prefix("HUDDLE").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("HUDDLE_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via HUDDLE_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.realtime.reconnect_delay_max_ms < config.realtime.reconnect_delay_ms {
        config.realtime.reconnect_delay_max_ms = config.realtime.reconnect_delay_ms;
    }

    debug!(?config, "loaded client configuration");
    Ok(config)
}
