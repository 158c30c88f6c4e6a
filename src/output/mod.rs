//! Output writers for reports, snapshots and flamegraphs.
//!
//! This module handles:
//! - Text rendering of flat and tree reports
//! - JSON snapshots (write and read back) and JSON report export
//! - SVG flamegraphs

pub mod json;
pub mod svg;
pub mod text;

// Re-export main functions
pub use json::{read_snapshot, write_report, write_snapshot, ReportFile, SnapshotFile};
pub use svg::write_svg;
pub use text::{ltruncate, render_flat, render_tree};

use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

/// Validate that output path is writable
///
/// **Public** - shared by every file writer
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Validate `path` and create its parent directories
pub(crate) fn prepare_output_path(path: &Path) -> Result<(), OutputError> {
    validate_path(path)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}
