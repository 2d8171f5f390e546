use matbench::counters::scripted::CounterCall;
use matbench::counters::{CounterKind, ScriptedCounters};
use matbench::error::BenchError;
use matbench::kernels::Variant;
use matbench::sink::{CSV_HEADER, CsvSink, ResultSink};
use matbench::sweep::{SweepPlan, run_sweep};
use matbench::TrialResult;

fn plan(sizes: &[usize], variants: &[Variant]) -> SweepPlan {
    SweepPlan {
        small_sizes: sizes.to_vec(),
        large_sizes: Vec::new(),
        block_sizes: Vec::new(),
        thread_counts: Vec::new(),
        variants: variants.to_vec(),
    }
}

fn session() -> ScriptedCounters {
    ScriptedCounters::new(&CounterKind::CACHE_MISSES, 100).with_count(CounterKind::L2DataMiss, 10)
}

#[test]
fn naive_over_two_sizes() {
    let mut session = session();
    let mut sink = CsvSink::new(Vec::new()).unwrap();

    let outcome = run_sweep(&plan(&[4, 8], &[Variant::Naive]), &mut session, &mut sink).unwrap();

    assert_eq!(outcome.results.len(), 2);
    assert!(outcome.skipped.is_empty());
    for (r, n) in outcome.results.iter().zip([4, 8]) {
        assert_eq!(r.variant, Variant::Naive);
        assert_eq!(r.size, n);
        assert_eq!(r.block_size, None);
        assert_eq!(r.threads, None);
        assert!(r.elapsed_secs >= 0.0);
        assert!(r.gflops > 0.0);
        assert_eq!(r.l1_misses, Some(100));
        assert_eq!(r.l2_misses, Some(10));
    }

    let csv = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], CSV_HEADER);
    assert!(lines[1].starts_with("naive,4,NA,"), "{}", lines[1]);
    assert!(lines[1].ends_with(",100,10,NA"), "{}", lines[1]);
    assert!(lines[2].starts_with("naive,8,NA,"), "{}", lines[2]);
}

#[test]
fn one_counter_window_per_trial() {
    let mut session = session();
    let mut sink: Vec<TrialResult> = Vec::new();

    run_sweep(&plan(&[2, 3, 4], &[Variant::Naive, Variant::Line]), &mut session, &mut sink)
        .unwrap();

    let expected: Vec<CounterCall> = std::iter::repeat([
        CounterCall::Start,
        CounterCall::Stop,
        CounterCall::Reset,
    ])
    .take(6)
    .flatten()
    .collect();
    assert_eq!(session.calls(), expected.as_slice());
    assert_eq!(sink.len(), 6);
}

#[test]
fn allocation_failure_skips_only_that_trial() {
    let mut session = session();
    let mut sink: Vec<TrialResult> = Vec::new();

    let outcome = run_sweep(
        &plan(&[4, 1 << 31, 8], &[Variant::Line]),
        &mut session,
        &mut sink,
    )
    .unwrap();

    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].spec.size, 1 << 31);
    assert_eq!(sink.iter().map(|r| r.size).collect::<Vec<_>>(), vec![4, 8]);
}

#[test]
fn counter_failure_aborts_sweep() {
    let mut session = session().fail_start_after(2);
    let mut sink: Vec<TrialResult> = Vec::new();

    let err = run_sweep(&plan(&[2, 3, 4, 5], &[Variant::Naive]), &mut session, &mut sink)
        .unwrap_err();

    assert!(matches!(err, BenchError::CounterInit(_)));
    // Results recorded before the failure are kept.
    assert_eq!(sink.len(), 2);
}

#[test]
fn output_failure_aborts_sweep() {
    struct Broken;
    impl ResultSink for Broken {
        fn record(&mut self, _: &TrialResult) -> Result<(), BenchError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }
    }

    let mut session = session();
    let err = run_sweep(&plan(&[2, 3], &[Variant::Naive]), &mut session, &mut Broken).unwrap_err();
    assert!(matches!(err, BenchError::Output(_)));
}

#[test]
fn full_layout_with_every_variant() {
    let plan = SweepPlan {
        small_sizes: vec![6, 10],
        large_sizes: vec![12, 20],
        block_sizes: vec![4, 8, 20],
        thread_counts: vec![1, 3],
        variants: Variant::ALL.to_vec(),
    };
    let mut session = session();
    let mut sink: Vec<TrialResult> = Vec::new();

    let outcome = run_sweep(&plan, &mut session, &mut sink).unwrap();

    // 2 sizes × (2 plain + 2 thread counts × 2 threaded) + 2 sizes × 3 blocks
    assert_eq!(outcome.results.len(), 2 * (2 + 2 * 2) + 2 * 3);
    for r in &outcome.results {
        let expected = vec![(r.size * (r.size + 1) / 2) as f64; r.size.min(10)];
        assert_eq!(r.sample, expected, "{:?}", r);
        match r.variant {
            Variant::Block => assert!(r.block_size.is_some() && r.threads.is_none()),
            Variant::ParallelOuter | Variant::ParallelInner => {
                assert!(r.threads.is_some() && r.block_size.is_none())
            }
            _ => assert!(r.threads.is_none() && r.block_size.is_none()),
        }
    }
}

#[test]
fn csv_file_survives_aborted_sweep() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.csv");

    let mut session = session().fail_start_after(1);
    let mut sink = CsvSink::create(&path).unwrap();
    assert!(run_sweep(&plan(&[2, 3], &[Variant::Naive]), &mut session, &mut sink).is_err());
    drop(sink);

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("naive,2,NA,"));
}
