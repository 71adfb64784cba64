//! Configuration data structures.
//!
//! Populated by deserializing `config.toml`. Every field has a default taken
//! from [`super::defaults`], and unknown fields are rejected via
//! `#[serde(deny_unknown_fields)]` so typos surface as parse errors.
//!
//! ```
//! use novade_core::config::CoreConfig;
//!
//! let toml_str = r#"
//! [connection]
//! endpoint = "wss://push.example.org/ws/notifications"
//!
//! [history]
//! max_items = 50
//! "#;
//! let config: CoreConfig = toml::from_str(toml_str).unwrap();
//! assert_eq!(config.connection.max_reconnect_attempts, 5);
//! assert_eq!(config.history.max_items, 50);
//! assert_eq!(config.presenter.banner_timeout_ms, 5000);
//! ```

use super::defaults;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration settings for the logging subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of "trace", "debug", "info", "warn", "error" (case-insensitive).
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    /// Optional log file. Relative paths are resolved against the app state directory.
    #[serde(default = "defaults::default_log_file_path")]
    pub file_path: Option<PathBuf>,
    /// "text" or "json".
    #[serde(default = "defaults::default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        defaults::default_logging_config()
    }
}

/// Where the push channel connects to and how it retries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// `ws://` or `wss://` URL of the notification channel.
    #[serde(default = "defaults::default_endpoint")]
    pub endpoint: String,
    /// Automatic reconnect attempts before the connection is declared failed.
    #[serde(default = "defaults::default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// Delay before the first reconnect attempt; doubles on each further attempt.
    #[serde(default = "defaults::default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl ConnectionConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        defaults::default_connection_config()
    }
}

/// Bounded notification history settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    /// Maximum number of retained notifications; the oldest are evicted first.
    #[serde(default = "defaults::default_history_max_items")]
    pub max_items: usize,
    /// History file. `None` means `notifications.json` in the app data
    /// directory; relative paths are resolved against that directory.
    #[serde(default = "defaults::default_history_file_path")]
    pub file_path: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        defaults::default_history_config()
    }
}

/// Presentation settings for OS alerts and in-app banners.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresenterConfig {
    /// How long an in-app banner stays visible unless dismissed earlier.
    #[serde(default = "defaults::default_banner_timeout_ms")]
    pub banner_timeout_ms: u64,
    /// Whether OS-level alerts are attempted at all.
    #[serde(default = "defaults::default_native_alerts")]
    pub native_alerts: bool,
}

impl PresenterConfig {
    pub fn banner_timeout(&self) -> Duration {
        Duration::from_millis(self.banner_timeout_ms)
    }
}

impl Default for PresenterConfig {
    fn default() -> Self {
        defaults::default_presenter_config()
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    #[serde(default = "defaults::default_logging_config")]
    pub logging: LoggingConfig,
    #[serde(default = "defaults::default_connection_config")]
    pub connection: ConnectionConfig,
    #[serde(default = "defaults::default_history_config")]
    pub history: HistoryConfig,
    #[serde(default = "defaults::default_presenter_config")]
    pub presenter: PresenterConfig,
}
