//! Error handling for the NovaDE core layer.
//!
//! The main error type for this crate is [`CoreError`], which wraps the more
//! specific [`ConfigError`] and [`LoggingError`]. Everything in the core layer
//! returns `Result<_, CoreError>` so callers in the notification crate can
//! attach it as the `source` of their own errors.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for the NovaDE notification service infrastructure.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Errors related to configuration loading, parsing, or validation.
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),

    /// Errors raised while installing the global `tracing` subscriber.
    #[error("Logging Error: {0}")]
    Logging(#[from] LoggingError),

    /// Filesystem operations (creating directories, reading or writing
    /// history files) that failed on a specific path.
    #[error("Filesystem Error: {message} (Path: {path:?})")]
    Filesystem {
        message: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// General I/O errors not covered by other specific variants.
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors due to invalid input provided to a function or method.
    #[error("Invalid Input: {0}")]
    InvalidInput(String),

    /// Catch-all for unexpected internal errors within the core library.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` when the error describes a file that simply does not
    /// exist yet, which callers usually treat as "empty" rather than failure.
    pub fn is_not_found_error(&self) -> bool {
        match self {
            CoreError::Filesystem { source, .. } | CoreError::Io(source) => {
                source.kind() == io::ErrorKind::NotFound
            }
            CoreError::Config(ConfigError::ReadError { source, .. }) => {
                source.kind() == io::ErrorKind::NotFound
            }
            _ => false,
        }
    }
}

/// Error type for configuration-related operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An error occurred while attempting to read a configuration file.
    #[error("Failed to read configuration file from {path:?}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or does not match the schema.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Parsed successfully, but a value is out of range or malformed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// A required base directory (e.g., XDG config/data home) could not be determined.
    #[error("Could not determine base directory for {dir_type}")]
    DirectoryUnavailable { dir_type: String },
}

/// Error type for logging-related operations.
#[derive(Error, Debug)]
pub enum LoggingError {
    /// Failed to initialize the logging system (invalid level, subscriber already set, ...).
    #[error("Failed to initialize logging: {0}")]
    InitializationFailure(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_core_error_config_variant() {
        let core_err = CoreError::from(ConfigError::ValidationError("bad endpoint".to_string()));
        assert_eq!(
            format!("{}", core_err),
            "Configuration Error: Configuration validation failed: bad endpoint"
        );
        assert!(core_err.source().is_some());
    }

    #[test]
    fn test_core_error_filesystem_variant_keeps_source() {
        let err = CoreError::Filesystem {
            message: "Failed to write history".to_string(),
            path: PathBuf::from("/tmp/history.json"),
            source: IoError::new(ErrorKind::PermissionDenied, "denied"),
        };
        assert!(format!("{}", err).contains("Failed to write history"));
        assert_eq!(err.source().unwrap().to_string(), "denied");
    }

    #[test]
    fn test_is_not_found_error() {
        let missing = CoreError::Filesystem {
            message: "read".to_string(),
            path: PathBuf::from("/nope"),
            source: IoError::new(ErrorKind::NotFound, "missing"),
        };
        assert!(missing.is_not_found_error());

        let io_missing = CoreError::Io(IoError::new(ErrorKind::NotFound, "missing"));
        assert!(io_missing.is_not_found_error());

        let denied = CoreError::Io(IoError::new(ErrorKind::PermissionDenied, "denied"));
        assert!(!denied.is_not_found_error());
        assert!(!CoreError::Internal("x".to_string()).is_not_found_error());
    }

    #[test]
    fn test_logging_error_display() {
        let err = CoreError::from(LoggingError::InitializationFailure("already set".to_string()));
        assert_eq!(
            format!("{}", err),
            "Logging Error: Failed to initialize logging: already set"
        );
    }
}
