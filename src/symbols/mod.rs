//! Symbolication: mapping frame identifiers to function/file/line metadata.
//!
//! The aggregators only see the [`SymbolResolver`] trait. Two resolvers ship:
//! - [`SymbolTable`] - a serializable lookup table, used for persisted snapshots
//! - [`BacktraceResolver`] - resolves addresses of the running process

pub mod native;
pub mod table;

pub use native::BacktraceResolver;
pub use table::{SymbolEntry, SymbolTable};

use crate::parser::schema::{FrameId, FrameInfo};

/// Resolve one frame. Implementations may return `Unresolved` for native
/// frames when `include_native` is false.
pub trait SymbolResolver {
    fn resolve(&self, frame: FrameId, include_native: bool) -> FrameInfo;
}

impl<R: SymbolResolver + ?Sized> SymbolResolver for &R {
    fn resolve(&self, frame: FrameId, include_native: bool) -> FrameInfo {
        (**self).resolve(frame, include_native)
    }
}

impl<R: SymbolResolver + ?Sized> SymbolResolver for Box<R> {
    fn resolve(&self, frame: FrameId, include_native: bool) -> FrameInfo {
        (**self).resolve(frame, include_native)
    }
}
