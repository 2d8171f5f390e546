//! One measured trial: allocate, count, multiply, record.

use crate::counters::{CounterKind, CounterSession};
use crate::error::BenchError;
use crate::kernels::{Kernel, Variant};
use crate::matrix::Matrix;
use std::fmt;
use std::time::Instant;

/// Kernel and problem size of one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialSpec {
    pub kernel: Kernel,
    pub size: usize,
}

impl TrialSpec {
    pub fn new(kernel: Kernel, size: usize) -> Self {
        Self { kernel, size }
    }
}

impl fmt::Display for TrialSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}x{}", self.kernel, self.size, self.size)
    }
}

/// Measurements of one trial.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialResult {
    pub variant: Variant,
    pub size: usize,
    pub block_size: Option<usize>,
    pub threads: Option<usize>,
    pub elapsed_secs: f64,
    pub gflops: f64,
    pub l1_misses: Option<u64>,
    pub l2_misses: Option<u64>,
    /// Leading elements of row 0 of C, for manual sanity checks.
    pub sample: Vec<f64>,
}

/// Throughput of an N×N×N multiplication: `2·N³ / (elapsed · 1e9)`.
///
/// A zero (or negative) duration, which a coarse clock can report for
/// tiny N, yields `f64::INFINITY` rather than a division fault.
pub fn gflops(n: usize, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 {
        return f64::INFINITY;
    }
    let n = n as f64;
    (2.0 * n * n * n) / (elapsed_secs * 1e9)
}

/// Runs one trial inside a counter window.
///
/// Operands are allocated before `start` and dropped after `reset`, so
/// neither allocation nor seeding is counted. Allocation failure returns
/// [`BenchError::Allocation`] without touching the session; any counter
/// error is returned as-is.
pub fn run_trial<S>(spec: &TrialSpec, session: &mut S) -> Result<TrialResult, BenchError>
where
    S: CounterSession + ?Sized,
{
    let n = spec.size;
    let a = Matrix::try_ones(n)?;
    let b = Matrix::try_row_ramp(n)?;
    let mut c = Matrix::try_zeroed(n)?;

    session.start()?;
    let start = Instant::now();

    spec.kernel.multiply(&a, &b, &mut c);

    let elapsed_secs = start.elapsed().as_secs_f64();
    let readings = session.stop()?;
    session.reset()?;

    let sample = c.sample().to_vec();
    drop((a, b, c));

    // Only kinds the session was opened for are meaningful.
    let reported = |kind: CounterKind| {
        if session.kinds().contains(&kind) {
            readings.get(kind)
        } else {
            None
        }
    };

    let result = TrialResult {
        variant: spec.kernel.variant(),
        size: n,
        block_size: spec.kernel.block_size(),
        threads: spec.kernel.threads(),
        elapsed_secs,
        gflops: gflops(n, elapsed_secs),
        l1_misses: reported(CounterKind::L1DataMiss),
        l2_misses: reported(CounterKind::L2DataMiss),
        sample,
    };

    tracing::info!(
        trial = %spec,
        elapsed_secs = result.elapsed_secs,
        gflops = result.gflops,
        l1_misses = ?result.l1_misses,
        l2_misses = ?result.l2_misses,
        "trial finished"
    );
    tracing::debug!(trial = %spec, sample = ?result.sample, "result sample");

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::ScriptedCounters;
    use crate::counters::scripted::CounterCall;

    #[test]
    fn gflops_formula() {
        for (n, secs) in [(1usize, 1.0), (4, 0.5), (600, 0.37), (3000, 41.2)] {
            let expected = 2.0 * (n as f64) * (n as f64) * (n as f64) / (secs * 1e9);
            assert_eq!(gflops(n, secs), expected);
        }
        assert_eq!(gflops(1000, 2.0), 1.0);
    }

    #[test]
    fn gflops_zero_elapsed() {
        assert_eq!(gflops(8, 0.0), f64::INFINITY);
    }

    #[test]
    fn trial_brackets_kernel_with_counters() {
        let mut session = ScriptedCounters::new(&CounterKind::CACHE_MISSES, 7)
            .with_count(CounterKind::L2DataMiss, 2);
        let spec = TrialSpec::new(Kernel::Line, 4);

        let result = run_trial(&spec, &mut session).unwrap();

        assert_eq!(
            session.calls(),
            &[CounterCall::Start, CounterCall::Stop, CounterCall::Reset]
        );
        assert_eq!(result.variant, Variant::Line);
        assert_eq!(result.size, 4);
        assert_eq!(result.block_size, None);
        assert_eq!(result.threads, None);
        assert_eq!(result.l1_misses, Some(7));
        assert_eq!(result.l2_misses, Some(2));
        assert_eq!(result.sample, vec![10.0; 4]);
        assert!(result.elapsed_secs >= 0.0);
        assert!(result.gflops > 0.0);
    }

    #[test]
    fn parameters_are_reported() {
        let mut session = ScriptedCounters::new(&CounterKind::CACHE_MISSES, 0);

        let blocked = Kernel::new(Variant::Block, Some(2), None).unwrap();
        let r = run_trial(&TrialSpec::new(blocked, 6), &mut session).unwrap();
        assert_eq!((r.block_size, r.threads), (Some(2), None));

        let threaded = Kernel::new(Variant::ParallelOuter, None, Some(3)).unwrap();
        let r = run_trial(&TrialSpec::new(threaded, 6), &mut session).unwrap();
        assert_eq!((r.block_size, r.threads), (None, Some(3)));
    }

    #[test]
    fn allocation_failure_leaves_session_untouched() {
        let mut session = ScriptedCounters::new(&CounterKind::CACHE_MISSES, 0);
        let err = run_trial(&TrialSpec::new(Kernel::Naive, 1 << 31), &mut session).unwrap_err();
        assert!(matches!(err, BenchError::Allocation { .. }));
        assert!(session.calls().is_empty());
    }

    #[test]
    fn counter_failure_propagates() {
        let mut session = ScriptedCounters::new(&CounterKind::CACHE_MISSES, 0).fail_start_after(0);
        let err = run_trial(&TrialSpec::new(Kernel::Naive, 2), &mut session).unwrap_err();
        assert!(matches!(err, BenchError::CounterInit(_)));
    }

    #[test]
    fn missing_kinds_are_absent() {
        let mut session = ScriptedCounters::new(&[CounterKind::L1DataMiss], 3);
        let r = run_trial(&TrialSpec::new(Kernel::Naive, 2), &mut session).unwrap();
        assert_eq!(r.l1_misses, Some(3));
        assert_eq!(r.l2_misses, None);
    }

    #[test]
    fn readings_outside_session_kinds_are_ignored() {
        let mut session = ScriptedCounters::new(&[CounterKind::L2DataMiss], 4)
            .with_count(CounterKind::L1DataMiss, 99);
        let r = run_trial(&TrialSpec::new(Kernel::Line, 3), &mut session).unwrap();
        assert_eq!(r.l1_misses, None);
        assert_eq!(r.l2_misses, Some(4));
    }
}
