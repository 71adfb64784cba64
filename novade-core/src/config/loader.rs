//! Configuration loading.
//!
//! [`ConfigLoader::load()`] reads `config.toml` from the application config
//! directory (see [`crate::utils::paths::get_app_config_dir`]). A missing or
//! empty file yields the defaults. The environment variable
//! [`ENDPOINT_ENV_VAR`] overrides the channel endpoint, and the result is
//! validated and normalized before it is returned.
//!
//! ```rust,ignore
//! use novade_core::config::ConfigLoader;
//!
//! match ConfigLoader::load() {
//!     Ok(config) => println!("Connecting to {}", config.connection.endpoint),
//!     Err(e) => {
//!         novade_core::logging::init_minimal_logging();
//!         tracing::error!("Configuration loading failed: {}", e);
//!     }
//! }
//! ```

use std::fs;
use std::path::Path;

use crate::config::defaults::{DEFAULT_HISTORY_FILE_NAME, MAX_HISTORY_ITEMS};
use crate::config::CoreConfig;
use crate::error::{ConfigError, CoreError};
use crate::utils::fs as nova_fs;
use crate::utils::paths::{get_app_config_dir, get_app_data_dir, get_app_state_dir};

/// Overrides `connection.endpoint` when set and non-empty.
pub const ENDPOINT_ENV_VAR: &str = "NOVADE_NOTIFY_WS_URL";

/// Namespace for configuration loading and validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads, overrides and validates the configuration from the default location.
    pub fn load() -> Result<CoreConfig, CoreError> {
        let config_path = get_app_config_dir()?.join("config.toml");
        let mut config = Self::read_config_file(&config_path)?;
        Self::apply_endpoint_override(&mut config, std::env::var(ENDPOINT_ENV_VAR).ok());
        Self::validate_config(&mut config)?;
        Ok(config)
    }

    /// Loads and validates the configuration from an explicit file.
    ///
    /// Unlike [`Self::load`], the environment override is not applied.
    pub fn load_from_path(path: &Path) -> Result<CoreConfig, CoreError> {
        let mut config = Self::read_config_file(path)?;
        Self::validate_config(&mut config)?;
        Ok(config)
    }

    fn read_config_file(path: &Path) -> Result<CoreConfig, CoreError> {
        match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => Ok(CoreConfig::default()),
            Ok(content) => Ok(toml::from_str(&content).map_err(ConfigError::ParseError)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No configuration file at {:?}, using defaults", path);
                Ok(CoreConfig::default())
            }
            Err(e) => Err(CoreError::Config(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })),
        }
    }

    /// Replaces the configured endpoint with `value` when it is non-empty.
    pub fn apply_endpoint_override(config: &mut CoreConfig, value: Option<String>) {
        if let Some(endpoint) = value.filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Endpoint overridden by {}: {}", ENDPOINT_ENV_VAR, endpoint);
            config.connection.endpoint = endpoint.trim().to_string();
        }
    }

    /// Validates the configuration and normalizes it in place.
    ///
    /// - log level and format are lower-cased and must be known values;
    /// - the endpoint must be a `ws://` or `wss://` URL;
    /// - `base_delay_ms`, `history.max_items` and `banner_timeout_ms` must be non-zero;
    /// - `history.max_items` may not exceed [`MAX_HISTORY_ITEMS`];
    /// - relative log paths are resolved against the state directory (parents are created);
    /// - the history path is resolved against the data directory.
    pub fn validate_config(config: &mut CoreConfig) -> Result<(), CoreError> {
        let level_lower = config.logging.level.to_lowercase();
        match level_lower.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => config.logging.level = level_lower,
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: '{}'. Must be one of trace, debug, info, warn, error.",
                    config.logging.level
                ))
                .into());
            }
        }

        let format_lower = config.logging.format.to_lowercase();
        match format_lower.as_str() {
            "text" | "json" => config.logging.format = format_lower,
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: '{}'. Must be one of text, json.",
                    config.logging.format
                ))
                .into());
            }
        }

        let endpoint = config.connection.endpoint.trim();
        if !(endpoint.starts_with("ws://") || endpoint.starts_with("wss://")) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid endpoint: '{}'. Must start with ws:// or wss://.",
                config.connection.endpoint
            ))
            .into());
        }
        config.connection.endpoint = endpoint.to_string();

        if config.connection.base_delay_ms == 0 {
            return Err(ConfigError::ValidationError(
                "connection.base_delay_ms must be greater than 0".to_string(),
            )
            .into());
        }
        if config.history.max_items == 0 || config.history.max_items > MAX_HISTORY_ITEMS {
            return Err(ConfigError::ValidationError(format!(
                "history.max_items must be between 1 and {}, got {}",
                MAX_HISTORY_ITEMS, config.history.max_items
            ))
            .into());
        }
        if config.presenter.banner_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "presenter.banner_timeout_ms must be greater than 0".to_string(),
            )
            .into());
        }

        if let Some(log_path) = &config.logging.file_path {
            let absolute_path = if log_path.is_absolute() {
                log_path.clone()
            } else {
                get_app_state_dir()?.join(log_path)
            };
            if let Some(parent_dir) = absolute_path.parent() {
                if !parent_dir.exists() {
                    nova_fs::ensure_dir_exists(parent_dir)?;
                }
            }
            config.logging.file_path = Some(absolute_path);
        }

        let history_path = match &config.history.file_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => get_app_data_dir()?.join(path),
            None => get_app_data_dir()?.join(DEFAULT_HISTORY_FILE_NAME),
        };
        config.history.file_path = Some(history_path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("config.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_from_path_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = ConfigLoader::load_from_path(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.connection, CoreConfig::default().connection);
        assert!(config.history.file_path.unwrap().ends_with(DEFAULT_HISTORY_FILE_NAME));
    }

    #[test]
    fn test_load_from_path_normalizes_values() {
        let dir = tempdir().unwrap();
        let history = dir.path().join("history.json");
        let path = write_config(
            dir.path(),
            &format!(
                concat!(
                    "[logging]\nlevel = \"DEBUG\"\nformat = \"Json\"\n\n",
                    "[connection]\nendpoint = \"  wss://push.example.org/ws  \"\n\n",
                    "[history]\nfile_path = {:?}\n",
                ),
                history
            ),
        );
        let config = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.connection.endpoint, "wss://push.example.org/ws");
        assert_eq!(config.history.file_path, Some(history));
    }

    #[test]
    fn test_load_from_path_parse_error() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), "[connection\nendpoint = ");
        let err = ConfigLoader::load_from_path(&path).unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::ParseError(_))));
    }

    #[rstest]
    #[case("[logging]\nlevel = \"verbose\"\n")]
    #[case("[logging]\nformat = \"xml\"\n")]
    #[case("[connection]\nendpoint = \"http://localhost:8000\"\n")]
    #[case("[connection]\nbase_delay_ms = 0\n")]
    #[case("[history]\nmax_items = 0\n")]
    #[case("[history]\nmax_items = 500\n")]
    #[case("[presenter]\nbanner_timeout_ms = 0\n")]
    fn test_load_from_path_validation_errors(#[case] content: &str) {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), content);
        let err = ConfigLoader::load_from_path(&path).unwrap_err();
        assert!(
            matches!(err, CoreError::Config(ConfigError::ValidationError(_))),
            "unexpected error for {:?}: {:?}",
            content,
            err
        );
    }

    #[test]
    fn test_absolute_log_path_parent_is_created() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("logs/notify.log");
        let path = write_config(dir.path(), &format!("[logging]\nfile_path = {:?}\n", log_path));
        let config = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(config.logging.file_path, Some(log_path.clone()));
        assert!(log_path.parent().unwrap().is_dir());
    }

    #[test]
    fn test_apply_endpoint_override() {
        let mut config = CoreConfig::default();
        ConfigLoader::apply_endpoint_override(&mut config, None);
        assert_eq!(config.connection.endpoint, CoreConfig::default().connection.endpoint);

        ConfigLoader::apply_endpoint_override(&mut config, Some("   ".to_string()));
        assert_eq!(config.connection.endpoint, CoreConfig::default().connection.endpoint);

        ConfigLoader::apply_endpoint_override(
            &mut config,
            Some("wss://push.example.org/ws".to_string()),
        );
        assert_eq!(config.connection.endpoint, "wss://push.example.org/ws");
    }
}
