//! Per-aggregation symbol cache.
//!
//! Each distinct frame is resolved once. Only reportable frames are kept:
//! unresolved frames, and native frames unless requested, never enter a
//! report.

use crate::parser::schema::{Capture, FrameId, ResolvedFrame};
use crate::symbols::SymbolResolver;
use log::debug;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use super::ordering::{compare_frames, same_key};

#[derive(Debug, Default)]
pub(crate) struct FrameCatalog {
    infos: HashMap<FrameId, ResolvedFrame>,
}

impl FrameCatalog {
    pub fn build<R>(captures: &[Capture], resolver: &R, include_native: bool) -> Self
    where
        R: SymbolResolver + ?Sized,
    {
        let mut infos = HashMap::new();
        let mut seen: HashSet<FrameId> = HashSet::new();
        for frame in captures.iter().flat_map(|c| c.frames().iter().copied()) {
            if !seen.insert(frame) {
                continue;
            }
            let info = resolver.resolve(frame, include_native);
            if info.is_reportable(include_native) {
                if let Some(resolved) = info.as_resolved() {
                    infos.insert(frame, resolved.clone());
                }
            }
        }
        debug!(
            "Resolved {} of {} distinct frames",
            infos.len(),
            seen.len()
        );
        Self { infos }
    }

    pub fn get(&self, frame: FrameId) -> Option<&ResolvedFrame> {
        self.infos.get(&frame)
    }

    /// Frames of `capture` that survive filtering, order preserved.
    pub fn filter(&self, capture: &Capture) -> Vec<FrameId> {
        capture
            .frames()
            .iter()
            .copied()
            .filter(|frame| self.infos.contains_key(frame))
            .collect()
    }

    /// Canonical order between two catalogued frames.
    pub fn compare(&self, a: FrameId, b: FrameId) -> Ordering {
        match (self.get(a), self.get(b)) {
            (Some(ia), Some(ib)) => compare_frames((ia, a), (ib, b)),
            // not reachable for filtered frames; keep the order total anyway
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.cmp(&b),
        }
    }

    pub fn same_symbol(&self, a: FrameId, b: FrameId) -> bool {
        match (self.get(a), self.get(b)) {
            (Some(ia), Some(ib)) => same_key(ia, ib),
            _ => a == b,
        }
    }
}
