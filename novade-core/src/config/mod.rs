//! Configuration management.
//!
//! - [`types`]: the schema ([`CoreConfig`] and its sections).
//! - [`defaults`]: default values applied by `serde` for missing fields.
//! - [`loader`]: [`ConfigLoader`], which locates, parses, overrides and
//!   validates `config.toml`.

pub mod defaults;
pub mod loader;
pub mod types;

pub use loader::{ConfigLoader, ENDPOINT_ENV_VAR};
pub use types::{ConnectionConfig, CoreConfig, HistoryConfig, LoggingConfig, PresenterConfig};
