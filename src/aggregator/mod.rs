//! Aggregation of decoded captures into reports.
//!
//! This module transforms captures into:
//! - A flat per-frame occurrence count
//! - A call tree grouped by shared stack prefix
//! - Collapsed stacks (for flamegraph generation)
//!
//! All three share one canonical ordering, see [`ordering`].

mod catalog;
pub mod flat;
pub mod ordering;
pub mod stack_builder;
pub mod tree;

// Re-export main types and functions
pub use flat::{flat, FlatOptions, FlatReport, FlatRow};
pub use stack_builder::{build_collapsed_stacks, CollapsedStack};
pub use tree::{tree, CallTree, NodeId, TreeNode, TreeOptions};
