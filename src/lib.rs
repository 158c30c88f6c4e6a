//! snapprof
//!
//! A sampling CPU profiler: a signal-driven writer records raw stack
//! snapshots into a fixed-capacity buffer, and the buffer is later decoded
//! into captures and aggregated into flat and call-tree reports.
//!
//! This crate provides the core implementation for the `snapprof` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! snapprof record --duration-ms 2000 --output snapshot.json
//! snapprof tree --input snapshot.json
//! ```
//!
//! In-process use goes through [`profiler::Profiler`]:
//!
//! ```ignore
//! let mut profiler = Profiler::new(SignalWriter::new(TimeMode::CpuTime), BacktraceResolver::new())?;
//! profiler.start()?;
//! run_workload();
//! profiler.stop();
//! println!("{}", render_tree(&profiler.tree(false, true)?, 100));
//! ```

pub mod aggregator;
pub mod commands;
pub mod flamegraph;
pub mod output;
pub mod parser;
pub mod profiler;
pub mod sampler;
pub mod symbols;
pub mod utils;
