//! General utilities for NovaDE Core.
//!
//! - [`fs`]: directory creation and atomic file writes.
//! - [`paths`]: XDG and application-specific directory resolution.

pub mod fs;
pub mod paths;

pub use fs::{ensure_dir_exists, read_to_string, write_string_atomically};
