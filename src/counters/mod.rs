//! Hardware performance counter sessions.
//!
//! A [`CounterSession`] is opened once per sweep and then cycled
//! `start` → `stop` → `reset` around every trial. Counters are a
//! process-wide resource, so only one session should be live at a time
//! and trials must never overlap.

pub mod perf;
pub mod scripted;

pub use perf::PerfCounterSession;
pub use scripted::ScriptedCounters;

use crate::error::BenchError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A named hardware event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CounterKind {
    /// Level-1 data cache misses.
    L1DataMiss,
    /// Level-2 data cache misses.
    L2DataMiss,
}

impl CounterKind {
    /// The counters recorded for every trial.
    pub const CACHE_MISSES: [CounterKind; 2] = [CounterKind::L1DataMiss, CounterKind::L2DataMiss];

    pub fn as_str(self) -> &'static str {
        match self {
            CounterKind::L1DataMiss => "L1_DCM",
            CounterKind::L2DataMiss => "L2_DCM",
        }
    }
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts accumulated between one `start` and the following `stop`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterReadings {
    values: BTreeMap<CounterKind, u64>,
}

impl CounterReadings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: CounterKind, count: u64) {
        self.values.insert(kind, count);
    }

    pub fn get(&self, kind: CounterKind) -> Option<u64> {
        self.values.get(&kind).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CounterKind, u64)> + '_ {
        self.values.iter().map(|(&k, &v)| (k, v))
    }
}

impl FromIterator<(CounterKind, u64)> for CounterReadings {
    fn from_iter<I: IntoIterator<Item = (CounterKind, u64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Lifecycle of a measured region.
///
/// Implementations must reject `start` while running and `stop` while
/// not running with [`BenchError::CounterState`]. A `reset` while running
/// would throw away in-flight counts, so it is logged and ignored.
pub trait CounterSession {
    /// The counter kinds this session reports.
    fn kinds(&self) -> &[CounterKind];

    /// Zeroes and enables every counter.
    fn start(&mut self) -> Result<(), BenchError>;

    /// Disables every counter and returns the counts since `start`.
    fn stop(&mut self) -> Result<CounterReadings, BenchError>;

    /// Zeroes the counters without closing the session.
    fn reset(&mut self) -> Result<(), BenchError>;

    /// Releases the counters. Failures are logged, never returned.
    /// Calling it again is a no-op.
    fn close(&mut self);
}

/// Shared start/stop/reset bookkeeping for session implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Closed,
}

impl SessionState {
    /// Checks a `start` request and moves to `Running`.
    pub fn begin(&mut self) -> Result<(), BenchError> {
        match self {
            SessionState::Idle => {
                *self = SessionState::Running;
                Ok(())
            }
            SessionState::Running => Err(BenchError::CounterState(
                "start called while counters are already running".into(),
            )),
            SessionState::Closed => Err(BenchError::CounterState(
                "start called on a closed session".into(),
            )),
        }
    }

    /// Checks a `stop` request and moves to `Idle`.
    pub fn end(&mut self) -> Result<(), BenchError> {
        match self {
            SessionState::Running => {
                *self = SessionState::Idle;
                Ok(())
            }
            SessionState::Idle => Err(BenchError::CounterState(
                "stop called without a matching start".into(),
            )),
            SessionState::Closed => Err(BenchError::CounterState(
                "stop called on a closed session".into(),
            )),
        }
    }

    /// Whether a reset may touch the counters. Logs and returns `false`
    /// while running.
    pub fn may_reset(&self) -> Result<bool, BenchError> {
        match self {
            SessionState::Idle => Ok(true),
            SessionState::Running => {
                tracing::warn!("reset ignored while counters are running");
                Ok(false)
            }
            SessionState::Closed => Err(BenchError::CounterState(
                "reset called on a closed session".into(),
            )),
        }
    }
}
