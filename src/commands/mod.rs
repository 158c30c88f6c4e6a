//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod models;
pub mod record;
pub mod report;
pub mod utils;

// Re-export main command functions
pub use models::{RecordArgs, ReportArgs};
pub use record::{execute_record, validate_record_args};
pub use report::{execute_export, execute_flamegraph, execute_flat, execute_tree};
pub use utils::{load_captures, validate_snapshot_file};
