use std::sync::Arc;

use super::store::SampleStore;
use super::writer::{CaptureWriter, TimeMode};
use crate::utils::error::TimerError;

/// POSIX per-thread timers are only wired up on Linux.
#[derive(Debug)]
pub struct SignalWriter {
    time_mode: TimeMode,
}

impl SignalWriter {
    pub fn new(time_mode: TimeMode) -> Self {
        Self { time_mode }
    }
}

impl CaptureWriter for SignalWriter {
    fn start(&mut self, _store: Arc<SampleStore>) -> Result<(), TimerError> {
        log::debug!("{:?} sampling is not available on this platform", self.time_mode);
        TimerError::from_code(TimerError::SIGNAL_HANDLER_UNAVAILABLE)
    }

    fn stop(&mut self) {}

    fn is_running(&self) -> bool {
        false
    }
}
