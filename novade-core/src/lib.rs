//! # NovaDE Core Library (`novade-core`)
//!
//! Infrastructure shared by the NovaDE notification delivery service:
//!
//! - **Error Handling**: [`CoreError`] with the more specific [`ConfigError`]
//!   and [`LoggingError`].
//! - **Configuration**: TOML-based [`CoreConfig`] loaded and validated by
//!   [`ConfigLoader`], with defaults for every field.
//! - **Logging**: `tracing` subscriber setup for console and rolling files.
//! - **Utilities**: XDG path resolution and atomic file writes.
//!
//! ```rust,ignore
//! use novade_core::config::ConfigLoader;
//! use novade_core::logging::init_logging;
//!
//! fn main() -> Result<(), novade_core::CoreError> {
//!     let config = ConfigLoader::load()?;
//!     init_logging(&config.logging, false)?;
//!     tracing::info!("Connecting to {}", config.connection.endpoint);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod utils;

pub use config::{
    ConfigLoader, ConnectionConfig, CoreConfig, HistoryConfig, LoggingConfig, PresenterConfig,
};
pub use error::{ConfigError, CoreError, LoggingError};
pub use logging::{init_logging, init_minimal_logging};
