//! JSON snapshot and report files.
//!
//! A snapshot file carries the raw buffer together with the symbols that
//! were resolved in the recording process, so it can be reported on later
//! from any machine.

use super::prepare_output_path;
use crate::aggregator::{CallTree, FlatReport};
use crate::parser::backtrace::{decode_with_stats, Decoded};
use crate::sampler::Snapshot;
use crate::symbols::SymbolTable;
use crate::utils::config::SNAPSHOT_VERSION;
use crate::utils::error::{OutputError, SnapshotError};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// On-disk form of a recorded profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotFile {
    /// Schema version (semver)
    pub version: String,

    /// RFC 3339 timestamp of when the snapshot was taken
    pub captured_at: String,

    #[serde(flatten)]
    pub snapshot: Snapshot,

    #[serde(default)]
    pub symbols: SymbolTable,
}

impl SnapshotFile {
    pub fn new(snapshot: Snapshot, symbols: SymbolTable) -> Self {
        Self {
            version: SNAPSHOT_VERSION.to_string(),
            captured_at: chrono::Utc::now().to_rfc3339(),
            snapshot,
            symbols,
        }
    }

    /// Decode the stored raw buffer
    pub fn decode(&self) -> Decoded {
        decode_with_stats(&self.snapshot.entries, self.snapshot.skip)
    }
}

/// Both reports of one snapshot, for machine consumption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFile {
    pub version: String,
    pub generated_at: String,
    pub flat: FlatReport,
    pub tree: CallTree,
}

impl ReportFile {
    pub fn new(flat: FlatReport, tree: CallTree) -> Self {
        Self {
            version: SNAPSHOT_VERSION.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            flat,
            tree,
        }
    }
}

fn write_json<T: Serialize>(value: &T, output_path: &Path) -> Result<(), OutputError> {
    prepare_output_path(output_path)?;

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;

    info!(
        "Written successfully ({} bytes)",
        calculate_file_size(output_path)
    );
    Ok(())
}

/// Write a snapshot to a JSON file
///
/// **Public** - main entry point for persisting a recording
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_snapshot(
    snapshot: &SnapshotFile,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    info!(
        "Writing snapshot ({} entries, {} symbols) to: {}",
        snapshot.snapshot.entries.len(),
        snapshot.symbols.len(),
        output_path.display()
    );
    write_json(snapshot, output_path)
}

/// Write flat and tree reports to a JSON file
///
/// **Public** - used by the `export` command
pub fn write_report(report: &ReportFile, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    info!("Writing report to: {}", output_path.display());
    write_json(report, output_path)
}

/// Read a snapshot back from a JSON file
///
/// **Public** - entry point for every reporting command
///
/// # Errors
/// * `SnapshotError::Io` - file cannot be read
/// * `SnapshotError::Json` - file is not a snapshot
/// * `SnapshotError::UnsupportedVersion` - written by an incompatible version
pub fn read_snapshot(input_path: impl AsRef<Path>) -> Result<SnapshotFile, SnapshotError> {
    let input_path = input_path.as_ref();

    debug!("Reading snapshot from: {}", input_path.display());

    let file = File::open(input_path)?;
    let snapshot: SnapshotFile = serde_json::from_reader(BufReader::new(file))?;

    if major(&snapshot.version) != major(SNAPSHOT_VERSION) {
        return Err(SnapshotError::UnsupportedVersion(snapshot.version));
    }

    debug!(
        "Snapshot loaded: version {}, captured at {}, {} entries",
        snapshot.version,
        snapshot.captured_at,
        snapshot.snapshot.entries.len()
    );

    Ok(snapshot)
}

fn major(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}

fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::schema::{FrameId, ResolvedFrame};
    use tempfile::NamedTempFile;

    fn create_test_snapshot() -> SnapshotFile {
        let snapshot = Snapshot {
            entries: vec![5, 7, 0, 11, 12, 7, 9, 0, 11, 12],
            skip: 2,
            capacity: 64,
            interval_nanos: 1_000_000,
            overflowed: false,
        };
        let symbols = SymbolTable::new()
            .with(FrameId::new(7).unwrap(), ResolvedFrame::source("main", "main.rs", 3));
        SnapshotFile::new(snapshot, symbols)
    }

    #[test]
    fn test_write_and_read_snapshot() {
        let snapshot = create_test_snapshot();
        let temp_file = NamedTempFile::new().unwrap();

        write_snapshot(&snapshot, temp_file.path()).unwrap();
        let loaded = read_snapshot(temp_file.path()).unwrap();

        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.decode().captures.len(), 2);
    }

    #[test]
    fn test_read_rejects_other_major_version() {
        let mut snapshot = create_test_snapshot();
        snapshot.version = "2.0.0".to_string();
        let temp_file = NamedTempFile::new().unwrap();
        write_snapshot(&snapshot, temp_file.path()).unwrap();

        let err = read_snapshot(temp_file.path()).unwrap_err();
        assert!(matches!(err, SnapshotError::UnsupportedVersion(v) if v == "2.0.0"));
    }

    #[test]
    fn test_read_accepts_minor_bump() {
        let mut snapshot = create_test_snapshot();
        snapshot.version = "1.4.0".to_string();
        let temp_file = NamedTempFile::new().unwrap();
        write_snapshot(&snapshot, temp_file.path()).unwrap();

        assert!(read_snapshot(temp_file.path()).is_ok());
    }

    #[test]
    fn test_read_malformed() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "{\"version\": ").unwrap();
        assert!(matches!(
            read_snapshot(temp_file.path()),
            Err(SnapshotError::Json(_))
        ));
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/snapshot.json");

        write_snapshot(&create_test_snapshot(), &nested_path).unwrap();

        assert!(nested_path.exists());
    }

    #[test]
    fn test_write_to_directory_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = write_snapshot(&create_test_snapshot(), temp_dir.path());
        assert!(matches!(result, Err(OutputError::InvalidPath(_))));
    }
}
