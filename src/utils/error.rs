//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while sizing the sample store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("Failed to allocate sample buffer of {capacity} entries")]
    AllocationFailed { capacity: usize },

    #[error("Sampling interval must be greater than zero")]
    InvalidInterval,

    #[error("Bookkeeping words per sample must be at most {max}, got {skip}")]
    InvalidSkip { skip: usize, max: usize },
}

/// Errors that can occur while starting the capture writer
///
/// Writers report failures as numeric codes; see [`TimerError::from_code`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    #[error("Could not install the profiling signal handler")]
    SignalHandlerUnavailable,

    #[error("Could not create the profiling timer")]
    TimerCreateFailed,

    #[error("Could not start the profiling timer")]
    TimerStartFailed,

    #[error("Capture writer failed with code {0}")]
    Unknown(i32),
}

impl TimerError {
    pub const SIGNAL_HANDLER_UNAVAILABLE: i32 = -1;
    pub const TIMER_CREATE_FAILED: i32 = -2;
    pub const TIMER_START_FAILED: i32 = -3;

    /// Map a writer status code to a result. `0` means the writer started.
    pub fn from_code(code: i32) -> Result<(), TimerError> {
        match code {
            0 => Ok(()),
            Self::SIGNAL_HANDLER_UNAVAILABLE => Err(TimerError::SignalHandlerUnavailable),
            Self::TIMER_CREATE_FAILED => Err(TimerError::TimerCreateFailed),
            Self::TIMER_START_FAILED => Err(TimerError::TimerStartFailed),
            other => Err(TimerError::Unknown(other)),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            TimerError::SignalHandlerUnavailable => Self::SIGNAL_HANDLER_UNAVAILABLE,
            TimerError::TimerCreateFailed => Self::TIMER_CREATE_FAILED,
            TimerError::TimerStartFailed => Self::TIMER_START_FAILED,
            TimerError::Unknown(code) => *code,
        }
    }
}

/// Errors surfaced by the profiler facade
#[derive(Error, Debug)]
pub enum ProfilerError {
    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error("Profiler is running; call stop() first")]
    Running,
}

/// Errors that can occur while reading a persisted snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(String),
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug)]
pub enum FlamegraphError {
    #[error("Empty stack data")]
    EmptyStacks,

    #[error("Failed to render flamegraph: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
