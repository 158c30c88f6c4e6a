//! Serializable symbol table.

use super::SymbolResolver;
use crate::parser::schema::{FrameId, FrameInfo, ResolvedFrame};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One table row as it appears on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub frame: FrameId,
    #[serde(flatten)]
    pub info: ResolvedFrame,
}

/// Lookup table from frame id to resolved metadata.
///
/// Frames absent from the table resolve to `Unresolved`. Serialized as a
/// list sorted by frame id so written files are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<SymbolEntry>", into = "Vec<SymbolEntry>")]
pub struct SymbolTable {
    symbols: HashMap<FrameId, ResolvedFrame>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, frame: FrameId, info: ResolvedFrame) {
        self.symbols.insert(frame, info);
    }

    /// Builder-style insert
    pub fn with(mut self, frame: FrameId, info: ResolvedFrame) -> Self {
        self.insert(frame, info);
        self
    }

    pub fn get(&self, frame: FrameId) -> Option<&ResolvedFrame> {
        self.symbols.get(&frame)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Resolve every distinct frame through `resolver` and keep the ones it
    /// could place, native frames included.
    ///
    /// **Public** - used to persist in-process symbols next to a snapshot
    pub fn capture_from<R, I>(resolver: &R, frames: I) -> Self
    where
        R: SymbolResolver + ?Sized,
        I: IntoIterator<Item = FrameId>,
    {
        let mut table = SymbolTable::new();
        let mut misses = 0usize;
        for frame in frames {
            if table.symbols.contains_key(&frame) {
                continue;
            }
            match resolver.resolve(frame, true) {
                FrameInfo::Resolved(info) => table.insert(frame, info),
                FrameInfo::Unresolved => misses += 1,
            }
        }
        debug!("Symbol table: {} resolved, {} unresolved", table.len(), misses);
        table
    }
}

impl SymbolResolver for SymbolTable {
    fn resolve(&self, frame: FrameId, include_native: bool) -> FrameInfo {
        match self.symbols.get(&frame) {
            Some(info) if include_native || !info.is_native => FrameInfo::Resolved(info.clone()),
            _ => FrameInfo::Unresolved,
        }
    }
}

impl From<Vec<SymbolEntry>> for SymbolTable {
    fn from(entries: Vec<SymbolEntry>) -> Self {
        Self {
            symbols: entries.into_iter().map(|e| (e.frame, e.info)).collect(),
        }
    }
}

impl From<SymbolTable> for Vec<SymbolEntry> {
    fn from(table: SymbolTable) -> Self {
        let mut entries: Vec<SymbolEntry> = table
            .symbols
            .into_iter()
            .map(|(frame, info)| SymbolEntry { frame, info })
            .collect();
        entries.sort_by_key(|e| e.frame);
        entries
    }
}
