//! Configuration and constants for the profiler and CLI.

use std::time::Duration;

/// Default number of raw buffer entries (frames + sentinels + bookkeeping)
pub const DEFAULT_CAPACITY: usize = 1_000_000;

/// Default time between two samples
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1);

/// Bookkeeping words the writer appends after each sentinel
pub const DEFAULT_SKIP: usize = 2;

/// Largest bookkeeping run a store accepts
pub const MAX_SKIP: usize = 8;

/// Deepest native stack the signal writer records per sample
pub const MAX_STACK_DEPTH: usize = 128;

/// Terminal width used when neither --width nor COLUMNS is set
pub const DEFAULT_WIDTH: usize = 100;

/// Spaces per tree level
pub const INDENT_WIDTH: usize = 2;

/// Marker placed in front of left-truncated names
pub const ELLIPSIS: &str = "…";

/// Current snapshot schema version
pub const SNAPSHOT_VERSION: &str = "1.0.0";

// Upper bound for a single `record` session, mostly to catch typos
pub const MAX_RECORD_DURATION_MS: u64 = 10 * 60 * 1000;
