//! In-process symbolication for addresses collected by the signal writer.
//!
//! Only meaningful inside the process that took the samples; persist the
//! result with [`SymbolTable::capture_from`](super::SymbolTable::capture_from)
//! to analyse a snapshot elsewhere.

use super::SymbolResolver;
use crate::parser::schema::{FrameId, FrameInfo, ResolvedFrame};
use std::ffi::c_void;

const UNKNOWN_FILE: &str = "<native>";

/// Resolver backed by the `backtrace` crate (DWARF line tables + symbol table).
#[derive(Debug, Default, Clone, Copy)]
pub struct BacktraceResolver;

impl BacktraceResolver {
    pub fn new() -> Self {
        Self
    }
}

impl SymbolResolver for BacktraceResolver {
    fn resolve(&self, frame: FrameId, include_native: bool) -> FrameInfo {
        let address = frame.get();
        // Sampled ips of outer frames are return addresses; the call site is one byte earlier.
        let lookup = address.saturating_sub(1) as *mut c_void;

        let mut info = FrameInfo::Unresolved;
        backtrace::resolve(lookup, |symbol| {
            // Inlined frames come first; keep the innermost one.
            if info.is_resolved() {
                return;
            }
            let Some(name) = symbol.name() else {
                return;
            };
            let function = name.to_string();

            info = match (symbol.filename(), symbol.lineno()) {
                (Some(file), Some(line)) => {
                    ResolvedFrame::source(function, file.display().to_string(), u64::from(line))
                        .into()
                }
                (file, _) => {
                    let offset = symbol
                        .addr()
                        .map(|start| address.saturating_sub(start as usize))
                        .unwrap_or(0);
                    let file = file
                        .map(|f| f.display().to_string())
                        .unwrap_or_else(|| UNKNOWN_FILE.to_string());
                    ResolvedFrame::native(function, file, offset as u64).into()
                }
            };
        });

        if info.is_reportable(include_native) {
            info
        } else {
            FrameInfo::Unresolved
        }
    }
}
