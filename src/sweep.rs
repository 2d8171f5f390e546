//! Iterating the configuration space one trial at a time.

use crate::counters::CounterSession;
use crate::error::BenchError;
use crate::kernels::{Kernel, ParamKind, Variant};
use crate::runner::{TrialResult, TrialSpec, run_trial};
use crate::sink::ResultSink;

/// The configuration space of a sweep.
///
/// Unparameterised and thread-parameterised variants run on
/// `small_sizes`; the blocked variant runs on `large_sizes`, where tiling
/// starts to pay off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepPlan {
    pub small_sizes: Vec<usize>,
    pub large_sizes: Vec<usize>,
    pub block_sizes: Vec<usize>,
    pub thread_counts: Vec<usize>,
    pub variants: Vec<Variant>,
}

impl SweepPlan {
    /// Rejects zero sizes, block sizes and thread counts before anything runs.
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.variants.is_empty() {
            return Err(BenchError::InvalidConfig("no variants selected".into()));
        }
        let checks = [
            ("matrix size", &self.small_sizes),
            ("matrix size", &self.large_sizes),
            ("block size", &self.block_sizes),
            ("thread count", &self.thread_counts),
        ];
        for (what, values) in checks {
            if values.contains(&0) {
                return Err(BenchError::InvalidConfig(format!("{} must be at least 1", what)));
            }
        }
        Ok(())
    }

    /// Every trial of the sweep, in execution order.
    ///
    /// For each small size: the unparameterised variants, then each
    /// thread count with every threaded variant. Then for each large size,
    /// each block size.
    pub fn trials(&self) -> Result<Vec<TrialSpec>, BenchError> {
        self.validate()?;

        let selected = |kind: ParamKind| -> Vec<Variant> {
            self.variants
                .iter()
                .copied()
                .filter(|v| v.param_kind() == kind)
                .collect()
        };
        let plain = selected(ParamKind::None);
        let threaded = selected(ParamKind::Threads);
        let blocked = selected(ParamKind::BlockSize);

        let mut trials = Vec::new();
        for &n in &self.small_sizes {
            for &v in &plain {
                trials.push(TrialSpec::new(Kernel::new(v, None, None)?, n));
            }
            for &t in &self.thread_counts {
                for &v in &threaded {
                    trials.push(TrialSpec::new(Kernel::new(v, None, Some(t))?, n));
                }
            }
        }
        for &n in &self.large_sizes {
            for &bs in &self.block_sizes {
                for &v in &blocked {
                    trials.push(TrialSpec::new(Kernel::new(v, Some(bs), None)?, n));
                }
            }
        }
        Ok(trials)
    }
}

/// A trial that was skipped after a recoverable error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTrial {
    pub spec: TrialSpec,
    pub reason: String,
}

/// What a completed sweep produced.
#[derive(Debug, Clone, Default)]
pub struct SweepOutcome {
    pub results: Vec<TrialResult>,
    pub skipped: Vec<SkippedTrial>,
}

/// Runs every trial of `plan` sequentially and forwards each result to
/// `sink` as soon as it is available.
///
/// An allocation failure skips that trial and the sweep carries on.
/// Counter and output errors abort the sweep; results already recorded
/// stay in the sink.
pub fn run_sweep<S, K>(
    plan: &SweepPlan,
    session: &mut S,
    sink: &mut K,
) -> Result<SweepOutcome, BenchError>
where
    S: CounterSession + ?Sized,
    K: ResultSink + ?Sized,
{
    let trials = plan.trials()?;
    tracing::info!(trials = trials.len(), "starting sweep");

    let mut outcome = SweepOutcome::default();
    for (idx, spec) in trials.iter().enumerate() {
        let _span = tracing::info_span!("trial", idx, of = trials.len()).entered();

        match run_trial(spec, session) {
            Ok(result) => {
                sink.record(&result)?;
                outcome.results.push(result);
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!(trial = %spec, error = %e, "trial skipped");
                outcome.skipped.push(SkippedTrial {
                    spec: *spec,
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                tracing::error!(trial = %spec, error = %e, "sweep aborted");
                return Err(e);
            }
        }
    }

    tracing::info!(
        completed = outcome.results.len(),
        skipped = outcome.skipped.len(),
        "sweep finished"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> SweepPlan {
        SweepPlan {
            small_sizes: vec![4, 8],
            large_sizes: vec![16],
            block_sizes: vec![2, 4],
            thread_counts: vec![1, 2],
            variants: Variant::ALL.to_vec(),
        }
    }

    #[test]
    fn trial_order_matches_sweep_layout() {
        let labels: Vec<String> = plan()
            .trials()
            .unwrap()
            .iter()
            .map(|t| t.to_string())
            .collect();

        assert_eq!(
            labels,
            vec![
                "naive 4x4",
                "line 4x4",
                "parallel-outer (1 threads) 4x4",
                "parallel-inner (1 threads) 4x4",
                "parallel-outer (2 threads) 4x4",
                "parallel-inner (2 threads) 4x4",
                "naive 8x8",
                "line 8x8",
                "parallel-outer (1 threads) 8x8",
                "parallel-inner (1 threads) 8x8",
                "parallel-outer (2 threads) 8x8",
                "parallel-inner (2 threads) 8x8",
                "block (block 2) 16x16",
                "block (block 4) 16x16",
            ]
        );
    }

    #[test]
    fn unselected_variants_are_left_out() {
        let mut p = plan();
        p.variants = vec![Variant::Block];
        let trials = p.trials().unwrap();
        assert_eq!(trials.len(), 2);
        assert!(trials.iter().all(|t| t.kernel.variant() == Variant::Block));
    }

    #[test]
    fn zero_parameters_rejected() {
        let mut p = plan();
        p.thread_counts.push(0);
        assert!(matches!(p.trials(), Err(BenchError::InvalidConfig(_))));

        let mut p = plan();
        p.block_sizes = vec![0];
        assert!(p.validate().is_err());

        let mut p = plan();
        p.small_sizes = vec![0];
        assert!(p.validate().is_err());

        let mut p = plan();
        p.variants.clear();
        assert!(p.validate().is_err());
    }
}
