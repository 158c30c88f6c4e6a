//! Core data model: frame identifiers, decoded captures and resolved frame metadata.
//!
//! Everything here is plain data. The raw buffer stores frames as bare `usize`
//! words; [`FrameId`] is the typed view of a non-sentinel word.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;

/// Opaque identifier of one stack frame (an instruction address for the
/// signal writer).
///
/// Zero is the capture sentinel and can never be a frame. Numeric order is
/// only used as the last tie-break when sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct FrameId(NonZeroUsize);

impl FrameId {
    /// Returns `None` for the sentinel value `0`.
    pub fn new(raw: usize) -> Option<Self> {
        NonZeroUsize::new(raw).map(FrameId)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<usize> for FrameId {
    type Error = String;

    fn try_from(raw: usize) -> Result<Self, Self::Error> {
        FrameId::new(raw).ok_or_else(|| "frame id 0 is reserved for the sentinel".to_string())
    }
}

impl From<FrameId> for usize {
    fn from(frame: FrameId) -> usize {
        frame.get()
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.get())
    }
}

/// One reconstructed call stack, outermost frame first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Capture {
    frames: Vec<FrameId>,
}

impl Capture {
    pub fn from_outermost(frames: Vec<FrameId>) -> Self {
        Self { frames }
    }

    /// Build a capture from the order the writer records frames in.
    pub fn from_innermost(mut frames: Vec<FrameId>) -> Self {
        frames.reverse();
        Self { frames }
    }

    pub fn frames(&self) -> &[FrameId] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn at_depth(&self, depth: usize) -> Option<FrameId> {
        self.frames.get(depth).copied()
    }
}

/// Symbol metadata for a frame that the resolver could place.
///
/// For native frames `line` carries the byte offset from the start of the
/// enclosing symbol rather than a source line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedFrame {
    pub function: String,
    pub file: String,
    pub line: u64,
    #[serde(default)]
    pub is_native: bool,
}

impl ResolvedFrame {
    /// A frame with source line information
    pub fn source(function: impl Into<String>, file: impl Into<String>, line: u64) -> Self {
        Self {
            function: function.into(),
            file: file.into(),
            line,
            is_native: false,
        }
    }

    /// A frame only known by symbol and offset
    pub fn native(function: impl Into<String>, file: impl Into<String>, offset: u64) -> Self {
        Self {
            function: function.into(),
            file: file.into(),
            line: offset,
            is_native: true,
        }
    }

    /// `line: 12` for source frames, `offset: 1f` for native ones
    pub fn location_label(&self) -> String {
        if self.is_native {
            format!("offset: {:x}", self.line)
        } else {
            format!("line: {}", self.line)
        }
    }
}

/// Outcome of resolving one [`FrameId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameInfo {
    Resolved(ResolvedFrame),
    Unresolved,
}

impl FrameInfo {
    pub fn as_resolved(&self) -> Option<&ResolvedFrame> {
        match self {
            FrameInfo::Resolved(frame) => Some(frame),
            FrameInfo::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, FrameInfo::Resolved(_))
    }

    /// Whether a report with the given native-frame policy keeps this frame.
    pub fn is_reportable(&self, include_native: bool) -> bool {
        match self {
            FrameInfo::Resolved(frame) => include_native || !frame.is_native,
            FrameInfo::Unresolved => false,
        }
    }
}

impl From<ResolvedFrame> for FrameInfo {
    fn from(frame: ResolvedFrame) -> Self {
        FrameInfo::Resolved(frame)
    }
}
