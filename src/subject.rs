//! The Fibonacci subject, registered with the harness
//!
//! [`record_fibonacci`] benchmarks one `fib(n)` call. In the recursive variant
//! every self-call goes back through [`Bench::record`], so the harness sees
//! the whole call tree but writes a single row for the outermost call.
//!
//! Each self-call still builds and binds its own argument list before the
//! guard sees it, so a recursive row's `elapsed_ms` and `peak_kib` include
//! that per-frame cost on top of the arithmetic. Self-calls pass only `n` and
//! let the schema default fill in `variant`, so no keyword is matched per
//! frame. Compare recursive rows with each other rather than with iterative
//! ones.

use crate::error::{HarnessError, Result};
use crate::fibonacci::{check_index, fibonacci_with, MemoTable, Variant};
use crate::harness::Bench;
use crate::sampler::{Clock, MemorySampler};
use crate::schema::{Call, Param, ParamDefault, SubjectSchema};

const FIBONACCI_PARAMS: &[Param] = &[
    Param::required("n"),
    Param::optional("variant", ParamDefault::Text("recursive")),
    Param::assistive("memo"),
];

/// `fibonacci(n, variant = "recursive", memo = None)`; the memo table is
/// not a CSV column
pub const FIBONACCI: SubjectSchema = SubjectSchema::new("fibonacci", FIBONACCI_PARAMS);

/// Compute `fib(n)` through the harness, recording one row
///
/// With `memo` set, the recursive variant reads and fills it; otherwise a
/// fresh table is used for this call. An unknown variant or an index above
/// [`MAX_N`](crate::fibonacci::MAX_N) fails before anything is measured or
/// written.
pub fn record_fibonacci<C: Clock, M: MemorySampler>(
    bench: &Bench<C, M>,
    n: u64,
    variant: &str,
    memo: Option<&mut MemoTable>,
) -> Result<u128> {
    variant.parse::<Variant>()?;
    check_index(n)?;

    let call = Call::new().arg(n).kwarg("variant", variant);
    match memo {
        Some(memo) => recorded(bench, call, memo),
        None => recorded(bench, call, &mut MemoTable::new()),
    }
}

fn recorded<C: Clock, M: MemorySampler>(
    bench: &Bench<C, M>,
    call: Call,
    memo: &mut MemoTable,
) -> Result<u128> {
    bench.record(&FIBONACCI, call, |args| {
        let n = args.uint("n")?;
        match args.text("variant")?.parse::<Variant>()? {
            Variant::Iterative => fibonacci_with(n, Variant::Iterative, None),
            Variant::Recursive => {
                if let Some(value) = memo.get(n) {
                    return Ok(value);
                }
                let value = recorded(bench, Call::new().arg(n - 1), memo)?
                    .checked_add(recorded(bench, Call::new().arg(n - 2), memo)?)
                    .ok_or(HarnessError::Overflow { n })?;
                Ok(memo.insert(n, value))
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_output::{header_line, CsvSink};
    use crate::fibonacci::MAX_N;
    use crate::sampler::tests::{FixedMemory, StepClock};
    use crate::sampler::Sampler;
    use serial_test::serial;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn bench(dir: &TempDir) -> Bench<StepClock, FixedMemory> {
        Bench::with_sampler(
            CsvSink::new(dir.path()),
            Sampler::with_collaborators(StepClock::new(Duration::from_micros(250)), FixedMemory(0)),
        )
    }

    fn lines(bench: &Bench<StepClock, FixedMemory>) -> Vec<String> {
        fs::read_to_string(bench.sink().path_for("fibonacci"))
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_schema_columns() {
        assert_eq!(
            header_line(&FIBONACCI),
            "algorithm,n,variant,elapsed_ms,peak_kib"
        );
    }

    #[test]
    #[serial]
    fn test_recursive_call_tree_records_one_row() {
        let dir = TempDir::new().unwrap();
        let bench = bench(&dir);

        assert_eq!(record_fibonacci(&bench, 20, "recursive", None).unwrap(), 6765);

        assert_eq!(
            lines(&bench),
            vec![
                "algorithm,n,variant,elapsed_ms,peak_kib".to_string(),
                "fibonacci,20,recursive,0.250,0.000".to_string(),
            ]
        );
    }

    #[test]
    #[serial]
    fn test_supplied_memo_is_filled() {
        let dir = TempDir::new().unwrap();
        let bench = bench(&dir);
        let mut memo = MemoTable::new();

        record_fibonacci(&bench, 20, "recursive", Some(&mut memo)).unwrap();
        for n in 0..=20 {
            assert!(memo.contains(n));
        }
    }

    #[test]
    #[serial]
    fn test_iterative_row() {
        let dir = TempDir::new().unwrap();
        let bench = bench(&dir);

        assert_eq!(record_fibonacci(&bench, 38, "iterative", None).unwrap(), 39088169);
        assert_eq!(lines(&bench)[1], "fibonacci,38,iterative,0.250,0.000");
    }

    #[test]
    #[serial]
    fn test_unknown_variant_records_nothing() {
        let dir = TempDir::new().unwrap();
        let bench = bench(&dir);

        let err = record_fibonacci(&bench, 5, "random", None).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidArgument(ref msg) if msg.contains("random")));
        assert!(!bench.sink().path_for("fibonacci").exists());
    }

    #[test]
    #[serial]
    fn test_out_of_range_index_records_nothing() {
        let dir = TempDir::new().unwrap();
        let bench = bench(&dir);

        for n in [MAX_N + 1, 10_000, 100_000, u64::MAX] {
            for variant in ["recursive", "iterative"] {
                let err = record_fibonacci(&bench, n, variant, None).unwrap_err();
                assert!(matches!(err, HarnessError::Overflow { n: got } if got == n));
            }
        }
        assert!(!bench.sink().path_for("fibonacci").exists());
        assert_eq!(bench.depth(), 0);
    }

    #[test]
    #[serial]
    fn test_largest_index_records_one_row() {
        let dir = TempDir::new().unwrap();
        let bench = bench(&dir);

        let value = record_fibonacci(&bench, MAX_N, "recursive", None).unwrap();
        assert_eq!(value, 332825110087067562321196029789634457848);
        assert_eq!(lines(&bench).len(), 2);
        assert_eq!(lines(&bench)[1], "fibonacci,186,recursive,0.250,0.000");
    }
}
