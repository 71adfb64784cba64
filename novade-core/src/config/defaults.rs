//! Default configuration values.
//!
//! Used by `serde`'s `default` attribute in [`super::types`] when a value is
//! not present in `config.toml`.

use super::types::{ConnectionConfig, HistoryConfig, LoggingConfig, PresenterConfig};
use std::path::PathBuf;

pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8000/ws/notifications";
pub const DEFAULT_HISTORY_FILE_NAME: &str = "notifications.json";
/// Upper bound for `history.max_items`.
pub const MAX_HISTORY_ITEMS: usize = 100;

pub(crate) fn default_log_level() -> String {
    "info".to_string()
}

pub(crate) fn default_log_file_path() -> Option<PathBuf> {
    None
}

pub(crate) fn default_log_format() -> String {
    "text".to_string()
}

pub(crate) fn default_logging_config() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        file_path: default_log_file_path(),
        format: default_log_format(),
    }
}

pub(crate) fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

/// Attempts after the first failure: 1s, 2s, 4s, 8s, 16s.
pub(crate) fn default_max_reconnect_attempts() -> u32 {
    5
}

pub(crate) fn default_base_delay_ms() -> u64 {
    1000
}

pub(crate) fn default_connection_config() -> ConnectionConfig {
    ConnectionConfig {
        endpoint: default_endpoint(),
        max_reconnect_attempts: default_max_reconnect_attempts(),
        base_delay_ms: default_base_delay_ms(),
    }
}

pub(crate) fn default_history_max_items() -> usize {
    MAX_HISTORY_ITEMS
}

pub(crate) fn default_history_file_path() -> Option<PathBuf> {
    None
}

pub(crate) fn default_history_config() -> HistoryConfig {
    HistoryConfig {
        max_items: default_history_max_items(),
        file_path: default_history_file_path(),
    }
}

pub(crate) fn default_banner_timeout_ms() -> u64 {
    5000
}

pub(crate) fn default_native_alerts() -> bool {
    true
}

pub(crate) fn default_presenter_config() -> PresenterConfig {
    PresenterConfig {
        banner_timeout_ms: default_banner_timeout_ms(),
        native_alerts: default_native_alerts(),
    }
}
