//! Raw sample buffer decoding and the core data model.
//!
//! This module handles:
//! - Typed frame identifiers and decoded captures
//! - Resolved frame metadata
//! - Splitting the raw buffer into captures

pub mod backtrace;
pub mod schema;

// Re-export main types
pub use backtrace::{decode, decode_with_stats, encode, Decoded};
pub use schema::{Capture, FrameId, FrameInfo, ResolvedFrame};
