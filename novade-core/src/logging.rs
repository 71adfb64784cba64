//! Logging setup built on the `tracing` ecosystem.
//!
//! [`init_logging`] installs a console layer and, when configured, a daily
//! rolling file layer. [`init_minimal_logging`] is the fallback used by tests
//! and by binaries before configuration has been loaded.

use crate::config::LoggingConfig;
use crate::error::{CoreError, LoggingError};
use crate::utils;

use once_cell::sync::Lazy;
use std::io::stdout;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Initializes a minimal logging setup on `stderr`.
///
/// Honours `RUST_LOG`, defaulting to "info". Errors (e.g. a subscriber is
/// already installed) are ignored, so this can be called repeatedly.
pub fn init_minimal_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .try_init();
}

fn parse_level(level: &str) -> Result<Level, CoreError> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        invalid => Err(LoggingError::InitializationFailure(format!(
            "Invalid log level in config: {}",
            invalid
        ))
        .into()),
    }
}

/// Creates the daily rolling file layer and the guard that flushes it.
fn create_file_layer(
    log_path: &Path,
    format: &str,
) -> Result<(BoxedLayer, WorkerGuard), CoreError> {
    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    utils::fs::ensure_dir_exists(directory)?;

    let file_name = log_path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("notify.log"));
    let file_appender = tracing_appender::rolling::daily(directory, file_name);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let layer = match format {
        "json" => fmt::layer()
            .json()
            .with_writer(non_blocking_writer)
            .with_ansi(false)
            .boxed(),
        _ => fmt::layer()
            .with_writer(non_blocking_writer)
            .with_ansi(false)
            .boxed(),
    };
    Ok((layer, guard))
}

/// Keeps the file writer alive for the lifetime of the process.
static LOG_WORKER_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

/// Installs the global subscriber described by `config`.
///
/// With `is_reload == false` an already-installed subscriber is an error;
/// with `is_reload == true` the attempt is reported on stderr and `Ok` is returned.
pub fn init_logging(config: &LoggingConfig, is_reload: bool) -> Result<(), CoreError> {
    let level = parse_level(&config.level)?;
    let format = config.format.to_lowercase();

    let stdout_layer = match format.as_str() {
        "json" => fmt::layer()
            .json()
            .with_writer(stdout)
            .with_ansi(false)
            .with_filter(EnvFilter::new(level.to_string()))
            .boxed(),
        _ => fmt::layer()
            .with_writer(stdout)
            .with_ansi(atty::is(atty::Stream::Stdout))
            .with_filter(EnvFilter::new(level.to_string()))
            .boxed(),
    };

    let mut layers: Vec<BoxedLayer> = vec![stdout_layer];
    let mut new_file_guard = None;
    if let Some(log_path) = &config.file_path {
        let (file_layer, guard) = create_file_layer(log_path, &format)?;
        layers.push(file_layer.with_filter(EnvFilter::new(level.to_string())).boxed());
        new_file_guard = Some(guard);
    }

    let result = Registry::default().with(layers).try_init();

    match LOG_WORKER_GUARD.lock() {
        Ok(mut slot) => *slot = new_file_guard,
        Err(e) => eprintln!(
            "[ERROR] Failed to lock LOG_WORKER_GUARD: {}. Log flushing may be affected.",
            e
        ),
    }

    match result {
        Ok(()) => Ok(()),
        Err(e) if is_reload => {
            eprintln!(
                "[INFO] Logging re-initialization attempted; previous subscriber stays active: {}",
                e
            );
            Ok(())
        }
        Err(e) => Err(LoggingError::InitializationFailure(format!(
            "Failed to set global tracing subscriber. Was it already initialized? Error: {}",
            e
        ))
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_minimal_logging_runs_twice_without_panic() {
        init_minimal_logging();
        init_minimal_logging();
        tracing::info!("minimal logging initialized");
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("WARN").unwrap(), Level::WARN);
        assert!(matches!(
            parse_level("loud"),
            Err(CoreError::Logging(LoggingError::InitializationFailure(_)))
        ));
    }

    #[test]
    fn test_create_file_layer_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("logs/notify.log");

        let result = create_file_layer(&log_path, "json");
        assert!(result.is_ok(), "create_file_layer failed: {:?}", result.err());
        assert!(log_path.parent().unwrap().is_dir());
    }

    #[test]
    fn test_init_logging_invalid_level() {
        let config = LoggingConfig {
            level: "chatty".to_string(),
            ..LoggingConfig::default()
        };
        assert!(init_logging(&config, false).is_err());
    }

    #[test]
    fn test_init_logging_reload_never_fails_when_subscriber_is_set() {
        init_minimal_logging();
        assert!(init_logging(&LoggingConfig::default(), true).is_ok());
    }
}
