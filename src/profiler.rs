//! Profiler facade tying a store, a capture writer and a resolver together.
//!
//! The store itself is lock-free and trusts its callers to stop sampling
//! before reading. The facade enforces that: every read and `clear` is
//! refused with [`ProfilerError::Running`] while the writer is active.

use crate::aggregator::{self, CallTree, FlatOptions, FlatReport, TreeOptions};
use crate::parser::backtrace::decode_with_stats;
use crate::parser::schema::Capture;
use crate::sampler::{CaptureWriter, OverflowWarning, SampleStore, Snapshot};
use crate::symbols::SymbolResolver;
use crate::utils::config::{DEFAULT_CAPACITY, DEFAULT_INTERVAL, DEFAULT_SKIP};
use crate::utils::error::ProfilerError;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

pub struct Profiler<W: CaptureWriter, R: SymbolResolver> {
    store: Arc<SampleStore>,
    writer: W,
    resolver: R,
    // the current fill's overflow was already returned by stop
    overflow_reported: bool,
}

impl<W: CaptureWriter, R: SymbolResolver> Profiler<W, R> {
    /// Profiler with the default capacity and interval
    pub fn new(writer: W, resolver: R) -> Result<Self, ProfilerError> {
        Self::with_config(writer, resolver, DEFAULT_CAPACITY, DEFAULT_INTERVAL, DEFAULT_SKIP)
    }

    pub fn with_config(
        writer: W,
        resolver: R,
        capacity: usize,
        interval: Duration,
        skip: usize,
    ) -> Result<Self, ProfilerError> {
        let store = Arc::new(SampleStore::new(capacity, interval, skip)?);
        Ok(Self {
            store,
            writer,
            resolver,
            overflow_reported: false,
        })
    }

    /// Replace the store with a fresh one, stopping first if running.
    ///
    /// On error the previous store is kept.
    pub fn init(&mut self, capacity: usize, interval: Duration) -> Result<(), ProfilerError> {
        if self.is_running() {
            self.stop();
        }
        let store = SampleStore::new(capacity, interval, self.store.skip())?;
        self.store = Arc::new(store);
        self.overflow_reported = false;
        info!(
            "Profiler initialised: {} entries, interval {:?}",
            capacity, interval
        );
        Ok(())
    }

    /// Start sampling. Starting a running profiler is a no-op.
    pub fn start(&mut self) -> Result<(), ProfilerError> {
        if self.is_running() {
            debug!("Profiler already running");
            return Ok(());
        }
        self.writer.start(Arc::clone(&self.store))?;
        debug!("Profiler started");
        Ok(())
    }

    /// Stop sampling.
    ///
    /// Returns, and logs, the overflow warning the first time a stop finds
    /// the store full. Later stops stay quiet until `clear` or `init`.
    pub fn stop(&mut self) -> Option<OverflowWarning> {
        if !self.is_running() {
            return None;
        }
        self.writer.stop();
        debug!("Profiler stopped with {} entries", self.store.len());

        if self.store.overflowed() && !self.overflow_reported {
            self.overflow_reported = true;
            let warning = OverflowWarning {
                capacity: self.store.capacity(),
            };
            warn!("{}", warning);
            return Some(warning);
        }
        None
    }

    pub fn is_running(&self) -> bool {
        self.writer.is_running()
    }

    pub fn clear(&mut self) -> Result<(), ProfilerError> {
        self.ensure_stopped()?;
        self.store.clear();
        self.overflow_reported = false;
        Ok(())
    }

    pub fn snapshot(&self) -> Result<Snapshot, ProfilerError> {
        self.ensure_stopped()?;
        Ok(self.store.snapshot())
    }

    /// Decode the recorded buffer into captures, outermost frame first
    pub fn decode(&self) -> Result<Vec<Capture>, ProfilerError> {
        let snapshot = self.snapshot()?;
        let decoded = decode_with_stats(&snapshot.entries, snapshot.skip);
        debug!(
            "Decoded {} captures ({} non-empty)",
            decoded.captures.len(),
            decoded.non_empty()
        );
        Ok(decoded.captures)
    }

    pub fn flat(&self, include_native: bool) -> Result<FlatReport, ProfilerError> {
        self.flat_with(FlatOptions {
            include_native,
            ..Default::default()
        })
    }

    pub fn flat_with(&self, options: FlatOptions) -> Result<FlatReport, ProfilerError> {
        let captures = self.decode()?;
        Ok(aggregator::flat(&captures, &self.resolver, options))
    }

    pub fn tree(
        &self,
        include_native: bool,
        merge_by_symbol: bool,
    ) -> Result<CallTree, ProfilerError> {
        let captures = self.decode()?;
        let options = TreeOptions {
            include_native,
            merge_by_symbol,
        };
        Ok(aggregator::tree(&captures, &self.resolver, options))
    }

    pub fn store(&self) -> &Arc<SampleStore> {
        &self.store
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    fn ensure_stopped(&self) -> Result<(), ProfilerError> {
        if self.is_running() {
            return Err(ProfilerError::Running);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::schema::{FrameId, ResolvedFrame};
    use crate::sampler::ManualWriter;
    use crate::symbols::SymbolTable;
    use crate::utils::config::MAX_SKIP;
    use crate::utils::error::ResourceError;

    fn id(raw: usize) -> FrameId {
        FrameId::new(raw).unwrap()
    }

    fn symbols() -> SymbolTable {
        SymbolTable::new()
            .with(id(5), ResolvedFrame::source("helper", "lib.rs", 20))
            .with(id(7), ResolvedFrame::source("main", "main.rs", 3))
            .with(id(9), ResolvedFrame::source("work", "lib.rs", 40))
    }

    fn profiler(capacity: usize) -> Profiler<ManualWriter, SymbolTable> {
        Profiler::with_config(
            ManualWriter::new(),
            symbols(),
            capacity,
            Duration::from_millis(1),
            DEFAULT_SKIP,
        )
        .unwrap()
    }

    #[test]
    fn test_reads_refused_while_running() {
        let mut profiler = profiler(64);
        profiler.start().unwrap();

        assert!(matches!(profiler.snapshot(), Err(ProfilerError::Running)));
        assert!(matches!(profiler.flat(false), Err(ProfilerError::Running)));
        assert!(matches!(profiler.tree(false, true), Err(ProfilerError::Running)));
        assert!(matches!(profiler.clear(), Err(ProfilerError::Running)));

        profiler.stop();
        assert!(profiler.snapshot().is_ok());
    }

    #[test]
    fn test_record_and_report() {
        let mut profiler = profiler(64);
        profiler.start().unwrap();
        profiler.writer_mut().sample_raw(&[5, 7]);
        profiler.writer_mut().sample_raw(&[7, 9]);
        assert!(profiler.stop().is_none());

        let flat = profiler.flat(false).unwrap();
        let counts: Vec<(usize, u64)> = flat.rows.iter().map(|r| (r.frame.get(), r.count)).collect();
        assert_eq!(counts, vec![(5, 1), (9, 1), (7, 2)]);

        let tree = profiler.tree(false, true).unwrap();
        assert_eq!(tree.total_count(), 2);
        assert_eq!(tree.roots().len(), 2);
    }

    #[test]
    fn test_clear_then_empty_reports() {
        let mut profiler = profiler(64);
        profiler.start().unwrap();
        profiler.writer_mut().sample_raw(&[5, 7]);
        profiler.stop();

        profiler.clear().unwrap();
        assert!(profiler.flat(false).unwrap().is_empty());
        assert!(profiler.tree(false, true).unwrap().is_empty());
    }

    #[test]
    fn test_stop_reports_overflow() {
        let mut profiler = profiler(4);
        profiler.start().unwrap();
        profiler.writer_mut().sample_raw(&[5, 7, 9]);
        profiler.writer_mut().sample_raw(&[5, 7, 9]);

        let warning = profiler.stop();
        assert_eq!(warning, Some(OverflowWarning { capacity: 4 }));
        // not running any more, nothing to report twice
        assert_eq!(profiler.stop(), None);
    }

    #[test]
    fn test_overflow_reported_once_per_fill() {
        let mut profiler = profiler(4);
        profiler.start().unwrap();
        profiler.writer_mut().sample_raw(&[5, 7, 9]);
        assert_eq!(profiler.stop(), Some(OverflowWarning { capacity: 4 }));

        // restarting on a full store drops samples silently
        profiler.start().unwrap();
        profiler.writer_mut().sample_raw(&[5]);
        assert_eq!(profiler.stop(), None);

        profiler.clear().unwrap();
        profiler.start().unwrap();
        profiler.writer_mut().sample_raw(&[5, 7, 9]);
        assert_eq!(profiler.stop(), Some(OverflowWarning { capacity: 4 }));

        profiler.init(4, Duration::from_millis(1)).unwrap();
        profiler.start().unwrap();
        profiler.writer_mut().sample_raw(&[5, 7, 9]);
        assert_eq!(profiler.stop(), Some(OverflowWarning { capacity: 4 }));
    }

    #[test]
    fn test_oversized_skip_rejected() {
        let result = Profiler::with_config(
            ManualWriter::new(),
            symbols(),
            64,
            Duration::from_millis(1),
            MAX_SKIP + 1,
        );
        assert!(matches!(
            result,
            Err(ProfilerError::Resource(ResourceError::InvalidSkip { .. }))
        ));
    }

    #[test]
    fn test_init_replaces_store_and_stops() {
        let mut profiler = profiler(64);
        profiler.start().unwrap();
        profiler.writer_mut().sample_raw(&[5]);

        profiler.init(128, Duration::from_millis(5)).unwrap();
        assert!(!profiler.is_running());
        assert_eq!(profiler.store().capacity(), 128);
        assert!(profiler.snapshot().unwrap().entries.is_empty());
    }

    #[test]
    fn test_init_rejects_zero_interval() {
        let mut profiler = profiler(64);
        let err = profiler.init(16, Duration::ZERO).unwrap_err();
        assert!(matches!(
            err,
            ProfilerError::Resource(ResourceError::InvalidInterval)
        ));
        assert_eq!(profiler.store().capacity(), 64);
    }
}
