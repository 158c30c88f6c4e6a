//! Sample collection: the raw store and the writers that fill it.
//!
//! This module handles:
//! - The fixed-capacity, lock-free raw buffer (`SampleStore`)
//! - Timer-driven sampling through `SIGPROF` on Linux (`SignalWriter`)
//! - Caller-driven sampling for replay and tests (`ManualWriter`)

pub mod store;
pub mod writer;

#[cfg(target_os = "linux")]
mod signal_writer;

#[cfg(not(target_os = "linux"))]
#[path = "signal_writer_unsupported_platform.rs"]
mod signal_writer;

// Re-export main types
pub use signal_writer::SignalWriter;
pub use store::{OverflowWarning, SampleStore, Snapshot};
pub use writer::{CaptureWriter, ManualWriter, TimeMode};
