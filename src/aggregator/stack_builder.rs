//! Build collapsed stack format from decoded captures.
//!
//! Collapsed stacks are the input format for flamegraph generation.
//! Format: "outer;middle;inner weight"
//!
//! Example: "main;run_workload;hash_block 12"
//! This means: 12 samples were taken while hash_block, called by
//! run_workload, called by main, was on the stack.

use super::catalog::FrameCatalog;
use crate::parser::schema::Capture;
use crate::symbols::SymbolResolver;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single collapsed stack entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated function names, outermost first
    pub stack: String,

    /// Number of samples with exactly this stack
    pub weight: u64,
}

impl CollapsedStack {
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// `stack weight`, one line of collapsed output
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Build collapsed stacks from captures
///
/// **Public** - main entry point for stack building
///
/// # Returns
/// One entry per unique stack, heaviest first, ties by stack text
pub fn build_collapsed_stacks<R>(
    captures: &[Capture],
    resolver: &R,
    include_native: bool,
) -> Vec<CollapsedStack>
where
    R: SymbolResolver + ?Sized,
{
    let catalog = FrameCatalog::build(captures, resolver, include_native);
    let mut stack_map: HashMap<String, u64> = HashMap::new();

    for capture in captures {
        let names: Vec<&str> = catalog
            .filter(capture)
            .into_iter()
            .filter_map(|frame| catalog.get(frame))
            .map(|info| info.function.as_str())
            .collect();
        if names.is_empty() {
            continue;
        }
        // ';' separates frames in the collapsed format
        let stack = names
            .iter()
            .map(|name| name.replace(';', ":"))
            .collect::<Vec<_>>()
            .join(";");
        *stack_map.entry(stack).or_insert(0) += 1;
    }

    let mut stacks: Vec<CollapsedStack> = stack_map
        .into_iter()
        .map(|(stack, weight)| CollapsedStack::new(stack, weight))
        .collect();
    stacks.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.stack.cmp(&b.stack)));

    debug!("Built {} unique collapsed stacks", stacks.len());

    stacks
}
