//! Flat report: how often each frame was on the stack, ignoring hierarchy.

use super::catalog::FrameCatalog;
use super::ordering::{compare_frames, merge_adjacent, same_key};
use crate::parser::schema::{Capture, FrameId, ResolvedFrame};
use crate::symbols::SymbolResolver;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Options for [`flat`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatOptions {
    /// Keep frames the resolver marks as native
    pub include_native: bool,

    /// Fold frames with equal `(file, function, line)` into one row.
    /// When false every frame id gets its own row.
    pub combine: bool,
}

impl Default for FlatOptions {
    fn default() -> Self {
        Self {
            include_native: false,
            combine: true,
        }
    }
}

/// One row of the flat report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRow {
    /// Representative frame (the lowest id among merged frames)
    pub frame: FrameId,
    pub info: ResolvedFrame,
    pub count: u64,
}

/// Rows in canonical order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatReport {
    pub rows: Vec<FlatRow>,

    /// Captures that contributed at least one reported frame
    pub total_captures: usize,
}

impl FlatReport {
    /// Sum adjacent rows that `same` considers equal into the first of them.
    ///
    /// Rows are in canonical order, so any key that is a prefix of
    /// `(file, function, line)` groups correctly. With the full key this is
    /// a no-op on a combined report.
    pub fn merge_adjacent_by<S>(self, same: S) -> Self
    where
        S: Fn(&FlatRow, &FlatRow) -> bool,
    {
        let rows = merge_adjacent(self.rows, same, |kept, dup| kept.count += dup.count);
        Self {
            rows,
            total_captures: self.total_captures,
        }
    }

    /// Sum of all row counts
    pub fn total_count(&self) -> u64 {
        self.rows.iter().map(|r| r.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Count every occurrence of every reportable frame across `captures`.
///
/// **Public** - main entry point for the flat report
///
/// A frame repeated within one capture (recursion) counts once per
/// occurrence. Unresolved frames are neither reported nor counted.
pub fn flat<R>(captures: &[Capture], resolver: &R, options: FlatOptions) -> FlatReport
where
    R: SymbolResolver + ?Sized,
{
    let catalog = FrameCatalog::build(captures, resolver, options.include_native);

    let mut counts: HashMap<FrameId, u64> = HashMap::new();
    let mut total_captures = 0;
    for capture in captures {
        let kept = catalog.filter(capture);
        if kept.is_empty() {
            continue;
        }
        total_captures += 1;
        for frame in kept {
            *counts.entry(frame).or_insert(0) += 1;
        }
    }

    let mut rows: Vec<FlatRow> = counts
        .into_iter()
        .filter_map(|(frame, count)| {
            catalog.get(frame).map(|info| FlatRow {
                frame,
                info: info.clone(),
                count,
            })
        })
        .collect();
    rows.sort_by(|a, b| compare_frames((&a.info, a.frame), (&b.info, b.frame)));

    debug!("Flat report: {} distinct frames", rows.len());

    let report = FlatReport {
        rows,
        total_captures,
    };
    if options.combine {
        report.merge_adjacent_by(|a, b| same_key(&a.info, &b.info))
    } else {
        report
    }
}
