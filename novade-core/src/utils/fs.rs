//! Filesystem Utilities.
//!
//! Helpers used by the configuration loader and the notification history
//! provider. All of them map `std::io::Error` into [`CoreError::Filesystem`]
//! so the failing path travels with the error.

use crate::error::CoreError;
use std::fs;
use std::path::Path;

/// Ensures that a directory exists at the given path, creating it and any
/// missing parents.
///
/// Fails if the path exists but is not a directory.
///
/// # Examples
///
/// ```no_run
/// # use novade_core::utils::fs::ensure_dir_exists;
/// # use tempfile::tempdir;
/// let temp_dir = tempdir().unwrap();
/// let dir_path = temp_dir.path().join("notify_state");
/// ensure_dir_exists(&dir_path).unwrap();
/// assert!(dir_path.is_dir());
/// ```
pub fn ensure_dir_exists(path: &Path) -> Result<(), CoreError> {
    if path.exists() {
        if !path.is_dir() {
            Err(CoreError::Filesystem {
                message: "Path exists but is not a directory".to_string(),
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "Path exists but is not a directory",
                ),
            })
        } else {
            Ok(())
        }
    } else {
        fs::create_dir_all(path).map_err(|e| CoreError::Filesystem {
            message: "Failed to create directory".to_string(),
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Reads the entire contents of a file into a string.
///
/// A missing file yields a [`CoreError::Filesystem`] whose
/// [`CoreError::is_not_found_error`] returns `true`.
pub fn read_to_string(path: &Path) -> Result<String, CoreError> {
    fs::read_to_string(path).map_err(|e| CoreError::Filesystem {
        message: "Failed to read file to string".to_string(),
        path: path.to_path_buf(),
        source: e,
    })
}

/// Replaces the contents of `path` with `content`.
///
/// The data is first written to a sibling `*.tmp` file and then renamed over
/// the target, so readers never observe a half-written file. Missing parent
/// directories are created.
pub fn write_string_atomically(path: &Path, content: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir_exists(parent)?;
        }
    }

    let mut tmp_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .ok_or_else(|| CoreError::InvalidInput(format!("Path has no file name: {:?}", path)))?;
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, content).map_err(|e| CoreError::Filesystem {
        message: "Failed to write temporary file".to_string(),
        path: tmp_path.clone(),
        source: e,
    })?;
    fs::rename(&tmp_path, path).map_err(|e| CoreError::Filesystem {
        message: "Failed to move temporary file into place".to_string(),
        path: path.to_path_buf(),
        source: e,
    })
}
