use std::str::FromStr;
use std::sync::Arc;

use super::store::{OverflowWarning, SampleStore};
use crate::parser::schema::Capture;
use crate::utils::error::TimerError;

/// Something that appends samples to a store while the profiled code runs.
pub trait CaptureWriter {
    fn start(&mut self, store: Arc<SampleStore>) -> Result<(), TimerError>;
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// Which clock drives the sampling timer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TimeMode {
    #[default]
    CpuTime,
    WallTime,
}

impl FromStr for TimeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpu" => Ok(Self::CpuTime),
            "wall" => Ok(Self::WallTime),
            other => Err(format!("unknown time mode '{}' (expected cpu or wall)", other)),
        }
    }
}

/// Writer driven by the caller instead of a timer.
///
/// Used for replaying known stacks and in tests. Samples pushed while
/// stopped are ignored, like a disarmed timer.
#[derive(Debug, Default)]
pub struct ManualWriter {
    store: Option<Arc<SampleStore>>,
    sequence: usize,
}

impl ManualWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sample given outermost first.
    pub fn sample(&mut self, capture: &Capture) -> Option<OverflowWarning> {
        let frames: Vec<usize> = capture.frames().iter().rev().map(|f| f.get()).collect();
        self.sample_raw(&frames)
    }

    /// Record one sample given innermost first, exactly as a stack walk yields it.
    pub fn sample_raw(&mut self, frames_innermost_first: &[usize]) -> Option<OverflowWarning> {
        let store = self.store.as_ref()?;
        self.sequence += 1;
        let bookkeeping: Vec<usize> = std::iter::once(self.sequence)
            .chain(std::iter::repeat(0))
            .take(store.skip())
            .collect();
        store.push_capture(frames_innermost_first, &bookkeeping)
    }
}

impl CaptureWriter for ManualWriter {
    fn start(&mut self, store: Arc<SampleStore>) -> Result<(), TimerError> {
        self.store = Some(store);
        Ok(())
    }

    fn stop(&mut self) {
        self.store = None;
    }

    fn is_running(&self) -> bool {
        self.store.is_some()
    }
}
