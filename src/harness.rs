//! Benchmark harness: bind, guard, measure, record
//!
//! [`Bench::record`] is the explicit form of a benchmarking decorator. It
//! binds the call to the subject's schema, asks the thread's [`CallDepth`]
//! whether this is the outermost measured call, runs the work through the
//! [`Sampler`] and appends one row for the outermost call only. Work that
//! calls back into `record` (a recursive subject) is run unmeasured and
//! produces no row of its own.
//!
//! A `Bench` is `!Sync`; each thread that benchmarks owns its own.

use crate::csv_output::{BenchmarkRow, CsvSink};
use crate::error::Result;
use crate::guard::CallDepth;
use crate::sampler::{AllocationSampler, Clock, MemorySampler, Sampler, SystemClock};
use crate::schema::{BoundArgs, Call, SubjectSchema};
use std::path::PathBuf;

/// Records measured calls of benchmark subjects into CSV files
#[derive(Debug)]
pub struct Bench<C = SystemClock, M = AllocationSampler> {
    sink: CsvSink,
    depth: CallDepth,
    sampler: Sampler<C, M>,
}

impl Bench {
    /// Harness writing under `output_dir` with the system clock and the
    /// allocation counters
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_sampler(CsvSink::new(output_dir), Sampler::new())
    }
}

impl<C: Clock, M: MemorySampler> Bench<C, M> {
    pub fn with_sampler(sink: CsvSink, sampler: Sampler<C, M>) -> Self {
        Self {
            sink,
            depth: CallDepth::new(),
            sampler,
        }
    }

    /// Sink the outermost calls are written to
    pub fn sink(&self) -> &CsvSink {
        &self.sink
    }

    /// Clock used for elapsed time and the series start stamp
    pub fn clock(&self) -> &C {
        self.sampler.clock()
    }

    /// Current nesting of measured calls on this harness
    pub fn depth(&self) -> usize {
        self.depth.current()
    }

    /// Truncate the subject's output file
    pub fn reset(&self, schema: &SubjectSchema) -> Result<PathBuf> {
        self.sink.reset(schema.name)
    }

    /// Run `work` as a call of `schema`, recording it if it is outermost
    ///
    /// The call is bound before anything runs; a call that does not fit the
    /// schema fails with `InvalidArgument` and neither runs `work` nor
    /// touches the output file. Errors from `work` are returned as-is and
    /// produce no row.
    ///
    /// # Example
    /// ```no_run
    /// use fibmark::harness::Bench;
    /// use fibmark::schema::{Call, Param, SubjectSchema};
    ///
    /// const SQUARE_PARAMS: &[Param] = &[Param::required("x")];
    /// const SQUARE: SubjectSchema = SubjectSchema::new("square", SQUARE_PARAMS);
    ///
    /// let bench = Bench::new("benchmarks");
    /// let y = bench
    ///     .record(&SQUARE, Call::new().arg(12u64), |args| {
    ///         let x = args.uint("x")?;
    ///         Ok(x * x)
    ///     })
    ///     .unwrap();
    /// assert_eq!(y, 144);
    /// ```
    pub fn record<T, F>(&self, schema: &SubjectSchema, call: Call, work: F) -> Result<T>
    where
        F: FnOnce(&BoundArgs) -> Result<T>,
    {
        let args = schema.bind(call)?;

        let guard = self.depth.enter();
        let outermost = guard.is_outermost();
        let measurement = self.sampler.measure(outermost, || work(&args))?;
        drop(guard);

        if measurement.nested {
            tracing::trace!(subject = schema.name, "nested call, not recorded");
            return Ok(measurement.value);
        }

        let row = BenchmarkRow {
            algorithm: schema.name.to_string(),
            fields: args.recorded_fields(),
            elapsed_ms: measurement.elapsed_ms,
            peak_kib: measurement.peak_kib,
        };
        let path = self.sink.append(schema, &row)?;
        tracing::debug!(
            subject = schema.name,
            elapsed_ms = measurement.elapsed_ms,
            peak_kib = measurement.peak_kib,
            path = %path.display(),
            "benchmark row recorded"
        );

        Ok(measurement.value)
    }
}
