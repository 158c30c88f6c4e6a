//! Decode the flat sample buffer into discrete captures.
//!
//! Buffer layout written by the capture writer, per sample:
//!
//! ```text
//! f_inner ... f_outer 0 b_1 ... b_skip
//! ```
//!
//! `0` terminates a capture; the `skip` words after it are writer
//! bookkeeping and are never interpreted, even when they are zero.

use super::schema::{Capture, FrameId};
use log::{debug, warn};
use std::mem;

/// Result of a decode pass, with diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Captures in buffer order, each outermost frame first
    pub captures: Vec<Capture>,

    /// Frames of a trailing run that never saw its sentinel
    pub dropped_trailing_frames: usize,

    /// Raw words examined
    pub total_entries: usize,
}

impl Decoded {
    /// Number of captures that hold at least one frame
    pub fn non_empty(&self) -> usize {
        self.captures.iter().filter(|c| !c.is_empty()).count()
    }
}

/// Decode `raw` into captures.
///
/// **Public** - main entry point for decoding
///
/// Pure and restartable: every call starts from the beginning of `raw`.
pub fn decode(raw: &[usize], skip: usize) -> Vec<Capture> {
    decode_with_stats(raw, skip).captures
}

/// Decode `raw` and report what was dropped.
///
/// A trailing run without a closing sentinel is the result of the buffer
/// filling mid-sample; its frames cannot be trusted and are discarded.
pub fn decode_with_stats(raw: &[usize], skip: usize) -> Decoded {
    let mut captures = Vec::new();
    let mut run: Vec<FrameId> = Vec::new();
    let mut pos = 0;

    while pos < raw.len() {
        match FrameId::new(raw[pos]) {
            Some(frame) => {
                run.push(frame);
                pos += 1;
            }
            None => {
                captures.push(Capture::from_innermost(mem::take(&mut run)));
                // bookkeeping words may hold anything, including 0
                pos = pos.saturating_add(1 + skip);
            }
        }
    }

    if !run.is_empty() {
        warn!(
            "Dropping {} frames of an incomplete trailing capture",
            run.len()
        );
    }

    debug!("Decoded {} captures from {} entries", captures.len(), raw.len());

    Decoded {
        captures,
        dropped_trailing_frames: run.len(),
        total_entries: raw.len(),
    }
}

/// Encode captures (outermost first) in the writer's layout.
///
/// Bookkeeping words are filled with `bookkeeping(index)`; used by the
/// synthetic writer and by tests.
pub fn encode<F>(captures: &[Capture], skip: usize, mut bookkeeping: F) -> Vec<usize>
where
    F: FnMut(usize) -> usize,
{
    let mut raw = Vec::new();
    for (index, capture) in captures.iter().enumerate() {
        raw.extend(capture.frames().iter().rev().map(|f| f.get()));
        raw.push(0);
        raw.extend((0..skip).map(|_| bookkeeping(index)));
    }
    raw
}
