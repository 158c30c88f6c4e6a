#![deny(unsafe_op_in_unsafe_fn)]

use std::ffi::{c_int, c_void};
use std::mem;
use std::ptr::null_mut;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::store::SampleStore;
use super::writer::{CaptureWriter, TimeMode};
use crate::utils::config::{MAX_SKIP, MAX_STACK_DEPTH};
use crate::utils::error::TimerError;

const PROFILING_SIGNAL: c_int = libc::SIGPROF;

/// Samples the thread that calls `start` with a POSIX timer and `SIGPROF`.
///
/// The store reaches the signal handler through `sigev_value.sival_ptr`;
/// there is no process-global state. `stop` must run on the thread that
/// called `start`, so the handler can never be mid-flight while its
/// arguments are freed.
pub struct SignalWriter {
    time_mode: TimeMode,
    active: Option<ActiveTimer>,
}

struct ActiveTimer {
    timer: libc::timer_t,
    previous_action: libc::sigaction,
    args: *mut SignalHandlerArgs,
    thread_id: libc::pid_t,
}

struct SignalHandlerArgs {
    store: Arc<SampleStore>,
    thread_id: usize,
    sequence: AtomicUsize,
    // bookkeeping words per capture, at most MAX_SKIP
    skip: usize,
}

impl SignalWriter {
    pub fn new(time_mode: TimeMode) -> Self {
        Self { time_mode, active: None }
    }

    fn current_thread_id() -> libc::pid_t {
        unsafe { libc::syscall(libc::SYS_gettid) as libc::pid_t }
    }

    // Returns 0 or one of the TimerError codes.
    fn arm(&mut self, store: Arc<SampleStore>) -> i32 {
        let interval = store.interval();
        let thread_id = Self::current_thread_id();

        let mut action: libc::sigaction = unsafe { mem::zeroed() };
        action.sa_sigaction = Self::signal_handler as usize;
        action.sa_flags = libc::SA_SIGINFO | libc::SA_RESTART;
        let mut previous_action: libc::sigaction = unsafe { mem::zeroed() };
        let err = unsafe {
            libc::sigemptyset(&mut action.sa_mask);
            libc::sigaction(PROFILING_SIGNAL, &action, &mut previous_action)
        };
        if err != 0 {
            return TimerError::SIGNAL_HANDLER_UNAVAILABLE;
        }

        let skip = store.skip().min(MAX_SKIP);
        let args = Box::into_raw(Box::new(SignalHandlerArgs {
            store,
            thread_id: thread_id as usize,
            sequence: AtomicUsize::new(0),
            skip,
        }));

        // SIGEV_THREAD_ID is Linux-specific: the signal always lands on the
        // sampled thread.
        let mut sigevent: libc::sigevent = unsafe { mem::zeroed() };
        sigevent.sigev_notify = libc::SIGEV_THREAD_ID;
        sigevent.sigev_notify_thread_id = thread_id;
        sigevent.sigev_signo = PROFILING_SIGNAL;
        sigevent.sigev_value.sival_ptr = args as *mut c_void;

        let clock = match self.time_mode {
            TimeMode::CpuTime => libc::CLOCK_THREAD_CPUTIME_ID,
            TimeMode::WallTime => libc::CLOCK_MONOTONIC,
        };
        let mut timer: libc::timer_t = unsafe { mem::zeroed() };
        let err = unsafe { libc::timer_create(clock, &mut sigevent, &mut timer) };
        if err != 0 {
            unsafe { Self::release(&previous_action, args) };
            return TimerError::TIMER_CREATE_FAILED;
        }

        let itimerspec = Self::duration_to_itimerspec(&interval);
        let err = unsafe { libc::timer_settime(timer, 0, &itimerspec, null_mut()) };
        if err != 0 {
            unsafe {
                libc::timer_delete(timer);
                Self::release(&previous_action, args);
            }
            return TimerError::TIMER_START_FAILED;
        }

        log::debug!(
            "Sampling timer armed for thread {} every {:?} ({:?})",
            thread_id,
            interval,
            self.time_mode
        );

        self.active = Some(ActiveTimer {
            timer,
            previous_action,
            args,
            thread_id,
        });
        0
    }

    /// # Safety
    /// `args` must come from `Box::into_raw` and no timer may still target it.
    unsafe fn release(previous_action: &libc::sigaction, args: *mut SignalHandlerArgs) {
        unsafe {
            libc::sigaction(PROFILING_SIGNAL, previous_action, null_mut());
            drop(Box::from_raw(args));
        }
    }

    // Runs on the sampled thread whenever the timer fires.
    //
    // Everything here must stay allocation- and lock-free. Walking the stack
    // with backtrace's unwinder is not formally async-signal-safe, but
    // collecting instruction pointers (without resolving them) holds up in
    // practice.
    extern "C" fn signal_handler(_sig: c_int, info: *mut libc::siginfo_t, _ucontext: *mut c_void) {
        if info.is_null() {
            return;
        }
        let ptr = unsafe { (*info).si_value().sival_ptr } as *const SignalHandlerArgs;
        if ptr.is_null() {
            return;
        }
        let args = unsafe { &*ptr };

        let mut frames = [0usize; MAX_STACK_DEPTH];
        let mut depth = 0;
        unsafe {
            backtrace::trace_unsynchronized(|frame| {
                let ip = frame.ip() as usize;
                // 0 is the sentinel
                if ip != 0 {
                    frames[depth] = ip;
                    depth += 1;
                }
                depth < MAX_STACK_DEPTH
            });
        }

        // [thread id, sequence], zero padded up to the store's skip
        let mut bookkeeping = [0usize; MAX_SKIP];
        bookkeeping[0] = args.thread_id;
        bookkeeping[1] = args.sequence.fetch_add(1, Ordering::Relaxed);
        // Overflow is remembered by the store and reported on stop
        let _ = args
            .store
            .push_capture(&frames[..depth], &bookkeeping[..args.skip]);
    }

    fn duration_to_itimerspec(duration: &Duration) -> libc::itimerspec {
        let mut its: libc::itimerspec = unsafe { mem::zeroed() };
        its.it_interval.tv_sec = duration.as_secs() as libc::time_t;
        its.it_interval.tv_nsec = duration.subsec_nanos() as libc::c_long;
        its.it_value = its.it_interval;
        its
    }
}

impl std::fmt::Debug for SignalWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalWriter")
            .field("time_mode", &self.time_mode)
            .field("running", &self.active.is_some())
            .finish()
    }
}

impl CaptureWriter for SignalWriter {
    fn start(&mut self, store: Arc<SampleStore>) -> Result<(), TimerError> {
        if self.active.is_some() {
            self.stop();
        }
        TimerError::from_code(self.arm(store))
    }

    fn stop(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        let current = Self::current_thread_id();
        if current != active.thread_id {
            log::warn!(
                "Sampling stopped from thread {} but was started on {}",
                current,
                active.thread_id
            );
        }

        unsafe {
            libc::timer_delete(active.timer);
            Self::release(&active.previous_action, active.args);
        }
        log::debug!("Sampling timer disarmed");
    }

    fn is_running(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for SignalWriter {
    fn drop(&mut self) {
        self.stop();
    }
}
