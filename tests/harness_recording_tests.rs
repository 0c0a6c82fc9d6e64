// Harness recording: one row per outermost call, header once, reset, and
// trace exclusivity, using the real clock and allocation counters.

use fibmark::fibonacci::MemoTable;
use fibmark::harness::Bench;
use fibmark::sampler::{self, AllocationSampler, TraceSession};
use fibmark::subject::{record_fibonacci, FIBONACCI};
use fibmark::HarnessError;
use serial_test::serial;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

#[test]
#[serial]
fn test_row_count_does_not_scale_with_recursion() {
    for n in [0u64, 1, 5, 10, 20, 38, 90] {
        let dir = TempDir::new().unwrap();
        let bench = Bench::new(dir.path());

        record_fibonacci(&bench, n, "recursive", None).unwrap();

        let lines = read_lines(&bench.sink().path_for("fibonacci"));
        assert_eq!(lines.len(), 2, "n = {} produced {:?}", n, lines);
        assert!(lines[1].starts_with(&format!("fibonacci,{},recursive,", n)));
    }
}

#[test]
#[serial]
fn test_header_then_one_line_per_outermost_call() {
    let dir = TempDir::new().unwrap();
    let bench = Bench::new(dir.path());
    bench.reset(&FIBONACCI).unwrap();

    record_fibonacci(&bench, 15, "recursive", None).unwrap();
    record_fibonacci(&bench, 15, "iterative", None).unwrap();

    let lines = read_lines(&bench.sink().path_for("fibonacci"));
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "algorithm,n,variant,elapsed_ms,peak_kib");
    assert!(lines[1..].iter().all(|l| !l.starts_with("algorithm")));
}

#[test]
#[serial]
fn test_reset_then_one_call_gives_two_lines() {
    let dir = TempDir::new().unwrap();
    let bench = Bench::new(dir.path());
    for n in 0..5 {
        record_fibonacci(&bench, n, "iterative", None).unwrap();
    }

    let path = bench.reset(&FIBONACCI).unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);

    record_fibonacci(&bench, 7, "recursive", None).unwrap();
    assert_eq!(read_lines(&path).len(), 2);
}

#[test]
#[serial]
fn test_fields_have_three_decimals() {
    let dir = TempDir::new().unwrap();
    let bench = Bench::new(dir.path());
    record_fibonacci(&bench, 30, "recursive", None).unwrap();

    let lines = read_lines(&bench.sink().path_for("fibonacci"));
    let fields: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(fields.len(), 5);
    for numeric in &fields[3..] {
        let (_, decimals) = numeric.split_once('.').unwrap();
        assert_eq!(decimals.len(), 3, "field {:?}", numeric);
        assert!(numeric.parse::<f64>().unwrap() >= 0.0);
    }
}

#[test]
#[serial]
fn test_shared_memo_survives_across_recorded_calls() {
    let dir = TempDir::new().unwrap();
    let bench = Bench::new(dir.path());
    let mut memo = MemoTable::new();

    assert_eq!(
        record_fibonacci(&bench, 38, "recursive", Some(&mut memo)).unwrap(),
        39088169
    );
    assert_eq!(memo.len(), 39);
    assert_eq!(
        record_fibonacci(&bench, 20, "recursive", Some(&mut memo)).unwrap(),
        6765
    );
    assert_eq!(memo.len(), 39);
}

#[test]
#[serial]
fn test_recording_rejected_while_tracing_elsewhere() {
    let dir = TempDir::new().unwrap();
    let bench = Bench::new(dir.path());
    let held = AllocationSampler::new();
    let session = TraceSession::start(&held).unwrap();

    let err = record_fibonacci(&bench, 10, "iterative", None).unwrap_err();
    assert!(matches!(err, HarnessError::TracingConflict));
    assert!(!bench.sink().path_for("fibonacci").exists());

    drop(session);
    assert!(!sampler::is_tracing());
    record_fibonacci(&bench, 10, "iterative", None).unwrap();
}

#[cfg(feature = "alloc-tracking")]
#[test]
#[serial]
fn test_conflicting_session_leaves_first_reading_intact() {
    let first_memory = AllocationSampler::new();
    let first = TraceSession::start(&first_memory).unwrap();

    let buffer = std::hint::black_box(vec![3u8; 64 * 1024]);
    let second_memory = AllocationSampler::new();
    assert!(matches!(
        TraceSession::start(&second_memory),
        Err(HarnessError::TracingConflict)
    ));
    drop(buffer);

    assert!(first.peak_kib() >= 60.0, "peak was {}", first.peak_kib());
}
