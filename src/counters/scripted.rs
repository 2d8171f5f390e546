//! In-memory counter session for tests and dry runs.

use super::{CounterKind, CounterReadings, CounterSession, SessionState};
use crate::error::BenchError;

/// One call made against a [`ScriptedCounters`] session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterCall {
    Start,
    Stop,
    Reset,
    Close,
}

/// Counter session that reports fixed counts.
///
/// Enforces the same lifecycle rules as the hardware session and records
/// every call so tests can check ordering around the measured region.
#[derive(Debug, Clone)]
pub struct ScriptedCounters {
    kinds: Vec<CounterKind>,
    counts: CounterReadings,
    state: SessionState,
    calls: Vec<CounterCall>,
    starts: usize,
    fail_start_after: Option<usize>,
}

impl ScriptedCounters {
    /// Session reporting `count` for every kind on each `stop`.
    pub fn new(kinds: &[CounterKind], count: u64) -> Self {
        Self {
            kinds: kinds.to_vec(),
            counts: kinds.iter().map(|&k| (k, count)).collect(),
            state: SessionState::Idle,
            calls: Vec::new(),
            starts: 0,
            fail_start_after: None,
        }
    }

    /// Overrides the count reported for one kind.
    pub fn with_count(mut self, kind: CounterKind, count: u64) -> Self {
        self.counts.insert(kind, count);
        self
    }

    /// Makes every `start` after the first `n` fail with `CounterInit`,
    /// as if the counter facility disappeared mid-sweep.
    pub fn fail_start_after(mut self, n: usize) -> Self {
        self.fail_start_after = Some(n);
        self
    }

    pub fn calls(&self) -> &[CounterCall] {
        &self.calls
    }

    pub fn state(&self) -> SessionState {
        self.state
    }
}

impl CounterSession for ScriptedCounters {
    fn kinds(&self) -> &[CounterKind] {
        &self.kinds
    }

    fn start(&mut self) -> Result<(), BenchError> {
        self.calls.push(CounterCall::Start);
        if self.fail_start_after.is_some_and(|n| self.starts >= n) {
            return Err(BenchError::CounterInit("scripted counter failure".into()));
        }
        self.state.begin()?;
        self.starts += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<CounterReadings, BenchError> {
        self.calls.push(CounterCall::Stop);
        self.state.end()?;
        Ok(self.counts.clone())
    }

    fn reset(&mut self) -> Result<(), BenchError> {
        self.calls.push(CounterCall::Reset);
        self.state.may_reset().map(|_| ())
    }

    fn close(&mut self) {
        self.calls.push(CounterCall::Close);
        self.state = SessionState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_twice_is_a_state_error() {
        let mut s = ScriptedCounters::new(&CounterKind::CACHE_MISSES, 1);
        s.start().unwrap();
        assert!(matches!(s.start(), Err(BenchError::CounterState(_))));
    }

    #[test]
    fn stop_without_start_is_a_state_error() {
        let mut s = ScriptedCounters::new(&CounterKind::CACHE_MISSES, 1);
        assert!(matches!(s.stop(), Err(BenchError::CounterState(_))));
    }

    #[test]
    fn reset_while_running_is_ignored() {
        let mut s = ScriptedCounters::new(&CounterKind::CACHE_MISSES, 1);
        s.start().unwrap();
        s.reset().unwrap();
        assert_eq!(s.state(), SessionState::Running);
        s.stop().unwrap();
        s.reset().unwrap();
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn reports_configured_counts() {
        let mut s = ScriptedCounters::new(&CounterKind::CACHE_MISSES, 5)
            .with_count(CounterKind::L2DataMiss, 9);
        s.start().unwrap();
        let r = s.stop().unwrap();
        assert_eq!(r.get(CounterKind::L1DataMiss), Some(5));
        assert_eq!(r.get(CounterKind::L2DataMiss), Some(9));
    }

    #[test]
    fn scripted_failure() {
        let mut s = ScriptedCounters::new(&CounterKind::CACHE_MISSES, 0).fail_start_after(1);
        s.start().unwrap();
        s.stop().unwrap();
        assert!(matches!(s.start(), Err(BenchError::CounterInit(_))));
    }

    #[test]
    fn closed_session_rejects_start() {
        let mut s = ScriptedCounters::new(&CounterKind::CACHE_MISSES, 0);
        s.close();
        assert!(s.start().is_err());
        assert_eq!(
            s.calls(),
            &[CounterCall::Close, CounterCall::Start]
        );
    }
}
