//! Application-Specific Path Resolution.
//!
//! Resolves the XDG directories used by the notification service, relying on
//! the `directories-next` crate:
//!
//! - [`get_app_config_dir()`]: e.g. `~/.config/notify` (holds `config.toml`).
//! - [`get_app_data_dir()`]: e.g. `~/.local/share/notify` (holds the notification history).
//! - [`get_app_state_dir()`]: e.g. `~/.local/state/notify` (holds log files).
//!
//! All functions yield [`ConfigError::DirectoryUnavailable`] when the home
//! directory cannot be determined.

use crate::error::{ConfigError, CoreError};
use directories_next::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "NovaDE";
const APPLICATION: &str = "notify";

fn project_dirs(dir_type: &str) -> Result<ProjectDirs, CoreError> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION).ok_or_else(|| {
        CoreError::Config(ConfigError::DirectoryUnavailable {
            dir_type: dir_type.to_string(),
        })
    })
}

/// Returns the directory that holds `config.toml`.
pub fn get_app_config_dir() -> Result<PathBuf, CoreError> {
    project_dirs("App Config").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the directory that holds the persisted notification history.
pub fn get_app_data_dir() -> Result<PathBuf, CoreError> {
    project_dirs("App Data").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Returns the directory used for log files.
///
/// On Linux this honours `$XDG_STATE_HOME`, falling back to
/// `$HOME/.local/state`; elsewhere the local data directory is used.
pub fn get_app_state_dir() -> Result<PathBuf, CoreError> {
    BaseDirs::new()
        .map(|dirs| {
            #[cfg(target_os = "linux")]
            {
                let base = match std::env::var("XDG_STATE_HOME") {
                    Ok(state_home) if !state_home.is_empty() => PathBuf::from(state_home),
                    _ => dirs.home_dir().join(".local/state"),
                };
                base.join(APPLICATION)
            }
            #[cfg(not(target_os = "linux"))]
            {
                dirs.data_local_dir().join(APPLICATION)
            }
        })
        .ok_or_else(|| {
            CoreError::Config(ConfigError::DirectoryUnavailable {
                dir_type: "App State".to_string(),
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_dirs_end_with_application_name() {
        // Home is available in the test environments we run in; if it is not,
        // the functions must fail with DirectoryUnavailable instead of panicking.
        match get_app_config_dir() {
            Ok(path) => assert!(path.to_string_lossy().to_lowercase().contains(APPLICATION)),
            Err(e) => assert!(matches!(
                e,
                CoreError::Config(ConfigError::DirectoryUnavailable { .. })
            )),
        }
        match get_app_state_dir() {
            Ok(path) => assert!(path.ends_with(APPLICATION)),
            Err(e) => assert!(matches!(
                e,
                CoreError::Config(ConfigError::DirectoryUnavailable { .. })
            )),
        }
    }
}
