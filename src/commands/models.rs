use crate::sampler::TimeMode;
use crate::utils::config::{DEFAULT_CAPACITY, DEFAULT_INTERVAL, DEFAULT_WIDTH};
use std::path::PathBuf;
use std::time::Duration;

/// Arguments for the record command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct RecordArgs {
    /// Output path for the JSON snapshot
    pub output: PathBuf,

    /// How long the built-in workload runs
    pub duration: Duration,

    /// Raw buffer entries
    pub capacity: usize,

    /// Time between two samples
    pub interval: Duration,

    pub time_mode: TimeMode,

    /// Replay generated stacks instead of sampling with signals
    pub synthetic: bool,

    /// Print the flat report after recording
    pub print_flat: bool,

    /// Print the tree report after recording
    pub print_tree: bool,

    /// Text width for printed reports
    pub width: usize,
}

impl Default for RecordArgs {
    fn default() -> Self {
        Self {
            output: PathBuf::from("snapshot.json"),
            duration: Duration::from_millis(1000),
            capacity: DEFAULT_CAPACITY,
            interval: DEFAULT_INTERVAL,
            time_mode: TimeMode::default(),
            synthetic: false,
            print_flat: false,
            print_tree: false,
            width: DEFAULT_WIDTH,
        }
    }
}

/// Arguments shared by the commands that report on a snapshot
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ReportArgs {
    /// Snapshot JSON to read
    pub input: PathBuf,

    /// Keep frames without source information
    pub include_native: bool,

    /// Fold flat rows with equal (file, function, line)
    pub combine: bool,

    /// Group tree nodes by (file, function, line) instead of frame id
    pub merge_by_symbol: bool,

    pub width: usize,
}

impl Default for ReportArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("snapshot.json"),
            include_native: false,
            combine: true,
            merge_by_symbol: true,
            width: DEFAULT_WIDTH,
        }
    }
}
