//! Timing and peak-memory measurement of a unit of work
//!
//! Only the outermost call of a recursive call tree is measured. Its numbers
//! include every nested call it makes; the nested calls themselves run
//! unmeasured and report zeros.
//!
//! Memory is observed through a trace session. There is at most one trace
//! session per process: a second [`TraceSession::start`] while one is open
//! fails with [`HarnessError::TracingConflict`] instead of producing two
//! corrupted peak readings.

use crate::alloc;
use crate::error::{HarnessError, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant, SystemTime};

static TRACE_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Whether a trace session is open anywhere in this process
pub fn is_tracing() -> bool {
    TRACE_ACTIVE.load(Ordering::Acquire)
}

/// Time source for measurements and log stamps
pub trait Clock {
    /// Current wall-clock time (UTC)
    fn now_utc(&self) -> SystemTime;

    /// Monotonic time since an arbitrary fixed origin
    fn monotonic(&self) -> Duration;
}

/// Clock backed by `SystemTime` and `Instant`
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_utc(&self) -> SystemTime {
        SystemTime::now()
    }

    fn monotonic(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Source of peak-memory readings for a trace session
pub trait MemorySampler {
    /// Called when a session opens; readings are relative to this point
    fn begin(&self);

    /// Highest memory use above the session start, in bytes
    fn peak_bytes(&self) -> u64;

    /// Called when the session closes
    fn end(&self) {}
}

/// Reads the counters kept by [`alloc::TrackingAllocator`]
#[derive(Debug, Default)]
pub struct AllocationSampler {
    baseline: AtomicUsize,
}

impl AllocationSampler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemorySampler for AllocationSampler {
    fn begin(&self) {
        alloc::reset_peak();
        self.baseline.store(alloc::current_bytes(), Ordering::Relaxed);
    }

    fn peak_bytes(&self) -> u64 {
        let baseline = self.baseline.load(Ordering::Relaxed);
        alloc::peak_bytes().saturating_sub(baseline) as u64
    }
}

/// An open, process-exclusive memory trace; closes on drop
#[derive(Debug)]
pub struct TraceSession<'a, M: MemorySampler + ?Sized> {
    memory: &'a M,
}

impl<'a, M: MemorySampler + ?Sized> TraceSession<'a, M> {
    /// Open a session, or fail if another one is already open
    pub fn start(memory: &'a M) -> Result<Self> {
        TRACE_ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| HarnessError::TracingConflict)?;
        memory.begin();
        Ok(Self { memory })
    }

    /// Peak memory above the session start, in KiB
    pub fn peak_kib(&self) -> f64 {
        self.memory.peak_bytes() as f64 / 1024.0
    }
}

impl<M: MemorySampler + ?Sized> Drop for TraceSession<'_, M> {
    fn drop(&mut self) {
        self.memory.end();
        TRACE_ACTIVE.store(false, Ordering::Release);
    }
}

/// Result of running work through a [`Sampler`]
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement<T> {
    pub value: T,
    /// Wall time in milliseconds (0 for nested calls)
    pub elapsed_ms: f64,
    /// Peak memory in KiB (0 for nested calls)
    pub peak_kib: f64,
    /// True when the call ran inside another measured call
    pub nested: bool,
}

/// Runs work under timing and memory capture
#[derive(Debug, Default)]
pub struct Sampler<C = SystemClock, M = AllocationSampler> {
    clock: C,
    memory: M,
}

impl Sampler {
    pub fn new() -> Self {
        Self::with_collaborators(SystemClock::new(), AllocationSampler::new())
    }
}

impl<C: Clock, M: MemorySampler> Sampler<C, M> {
    pub fn with_collaborators(clock: C, memory: M) -> Self {
        Self { clock, memory }
    }

    /// Clock the measurements are taken with
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Run `work`, measuring it only when `outermost` is set
    ///
    /// An error from `work` is returned after the trace session is closed.
    pub fn measure<T, F>(&self, outermost: bool, work: F) -> Result<Measurement<T>>
    where
        F: FnOnce() -> Result<T>,
    {
        if !outermost {
            return Ok(Measurement {
                value: work()?,
                elapsed_ms: 0.0,
                peak_kib: 0.0,
                nested: true,
            });
        }

        let session = TraceSession::start(&self.memory)?;
        let start = self.clock.monotonic();
        let outcome = work();
        let elapsed = self.clock.monotonic().saturating_sub(start);
        let peak_kib = session.peak_kib();
        drop(session);

        Ok(Measurement {
            value: outcome?,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            peak_kib,
            nested: false,
        })
    }
}
