//! Benchmark series driver
//!
//! Runs every configured variant of `fibonacci` for `n` in `0..max_n`, each
//! call on a freshly seeded memo table, and records one row per call.

use crate::csv_output::DEFAULT_OUTPUT_DIR;
use crate::error::Result;
use crate::fibonacci::{MemoTable, Variant};
use crate::harness::Bench;
use crate::sampler::{Clock, MemorySampler};
use crate::subject::{record_fibonacci, FIBONACCI};
use crate::version;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

/// Settings for one benchmark series
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub output_dir: PathBuf,
    /// Exclusive upper bound of `n`
    pub max_n: u64,
    /// Variant names, run in this order for every `n`
    pub variants: Vec<String>,
    /// Truncate the output file before the first row
    pub reset: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            max_n: 40,
            variants: Variant::ALL.iter().map(|v| v.to_string()).collect(),
            reset: false,
        }
    }
}

/// What a finished series wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub path: PathBuf,
    pub rows: usize,
    /// Short source revision, empty if unknown
    pub revision: String,
}

/// Run a series with the default harness
pub fn run_benchmarks(config: &BenchConfig) -> Result<RunSummary> {
    let bench = Bench::new(&config.output_dir);
    run_with(&bench, config)
}

/// Run a series through a caller-supplied harness
pub fn run_with<C: Clock, M: MemorySampler>(
    bench: &Bench<C, M>,
    config: &BenchConfig,
) -> Result<RunSummary> {
    // Reject bad variant names before anything is written
    for variant in &config.variants {
        variant.parse::<Variant>()?;
    }

    let revision = version::read_git_head();
    let started = bench
        .clock()
        .now_utc()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    tracing::info!(
        started_unix = started,
        revision = %revision,
        max_n = config.max_n,
        variants = ?config.variants,
        "starting benchmark series"
    );

    if config.reset {
        bench.reset(&FIBONACCI)?;
    }

    let mut memo = MemoTable::new();
    let mut rows = 0;
    for n in 0..config.max_n {
        for variant in &config.variants {
            memo.reset();
            record_fibonacci(bench, n, variant, Some(&mut memo))?;
            rows += 1;
        }
    }

    let path = bench.sink().path_for(FIBONACCI.name);
    tracing::info!(rows, path = %path.display(), "benchmark series finished");
    Ok(RunSummary {
        path,
        rows,
        revision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_output::CsvSink;
    use crate::error::HarnessError;
    use crate::sampler::tests::{FixedMemory, StepClock};
    use crate::sampler::Sampler;
    use serial_test::serial;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn bench(dir: &TempDir) -> Bench<StepClock, FixedMemory> {
        Bench::with_sampler(
            CsvSink::new(dir.path()),
            Sampler::with_collaborators(StepClock::new(Duration::from_millis(1)), FixedMemory(0)),
        )
    }

    fn config(dir: &TempDir, max_n: u64) -> BenchConfig {
        BenchConfig {
            output_dir: dir.path().to_path_buf(),
            max_n,
            ..BenchConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = BenchConfig::default();
        assert_eq!(config.max_n, 40);
        assert_eq!(config.variants, vec!["iterative", "recursive"]);
        assert_eq!(config.output_dir, PathBuf::from("benchmarks"));
        assert!(!config.reset);
    }

    #[test]
    #[serial]
    fn test_series_writes_one_row_per_call() {
        let dir = TempDir::new().unwrap();
        let bench = bench(&dir);

        let summary = run_with(&bench, &config(&dir, 10)).unwrap();
        assert_eq!(summary.rows, 20);

        let content = fs::read_to_string(&summary.path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 21);
        assert_eq!(lines[0], "algorithm,n,variant,elapsed_ms,peak_kib");
        assert_eq!(lines[1], "fibonacci,0,iterative,1.000,0.000");
        assert_eq!(lines[2], "fibonacci,0,recursive,1.000,0.000");
        assert_eq!(lines[20], "fibonacci,9,recursive,1.000,0.000");
    }

    #[test]
    #[serial]
    fn test_series_appends_unless_reset() {
        let dir = TempDir::new().unwrap();
        let bench = bench(&dir);

        run_with(&bench, &config(&dir, 3)).unwrap();
        let summary = run_with(&bench, &config(&dir, 3)).unwrap();
        assert_eq!(fs::read_to_string(&summary.path).unwrap().lines().count(), 13);

        let reset = BenchConfig {
            reset: true,
            ..config(&dir, 3)
        };
        let summary = run_with(&bench, &reset).unwrap();
        assert_eq!(fs::read_to_string(&summary.path).unwrap().lines().count(), 7);
    }

    #[test]
    #[serial]
    fn test_bad_variant_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let bench = bench(&dir);
        let config = BenchConfig {
            variants: vec!["iterative".to_string(), "random".to_string()],
            ..config(&dir, 5)
        };

        let err = run_with(&bench, &config).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidArgument(_)));
        assert!(!bench.sink().path_for("fibonacci").exists());
    }
}
