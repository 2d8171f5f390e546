//! Counter session backed by Linux `perf_event_open`.
//!
//! One counter per kind, opened on the calling process with `inherit`
//! set so that worker threads spawned inside the measured region are
//! included once they have been joined. Linux exposes no generic L2
//! event: level-2 misses are read from the last-level cache read-miss
//! event.

use super::{CounterKind, CounterReadings, CounterSession, SessionState};
use crate::error::BenchError;

#[cfg(target_os = "linux")]
use perf_event::events::{Cache, CacheOp, CacheResult, WhichCache};
#[cfg(target_os = "linux")]
use perf_event::{Builder, Counter};

/// Hardware counter session using the `perf-event` crate.
pub struct PerfCounterSession {
    kinds: Vec<CounterKind>,
    #[cfg(target_os = "linux")]
    counters: Vec<Counter>,
    state: SessionState,
}

impl std::fmt::Debug for PerfCounterSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerfCounterSession")
            .field("kinds", &self.kinds)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(target_os = "linux")]
fn cache_event(kind: CounterKind) -> Cache {
    let which = match kind {
        CounterKind::L1DataMiss => WhichCache::L1D,
        CounterKind::L2DataMiss => WhichCache::LL,
    };
    Cache {
        which,
        operation: CacheOp::READ,
        result: CacheResult::MISS,
    }
}

impl PerfCounterSession {
    /// Opens one disabled counter per kind.
    ///
    /// Fails with [`BenchError::CounterInit`] when perf events are not
    /// permitted (see `/proc/sys/kernel/perf_event_paranoid`) or the CPU
    /// does not expose one of the events.
    #[cfg(target_os = "linux")]
    pub fn open(kinds: &[CounterKind]) -> Result<Self, BenchError> {
        if kinds.is_empty() {
            return Err(BenchError::CounterInit("no counter kinds requested".into()));
        }

        let mut counters = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            let mut builder = Builder::new().kind(cache_event(kind));
            builder.inherit(true);
            let counter = builder
                .build()
                .map_err(|e| BenchError::CounterInit(format!("{}: {}", kind, e)))?;
            counters.push(counter);
        }

        tracing::debug!(?kinds, "perf counters opened");
        Ok(Self {
            kinds: kinds.to_vec(),
            counters,
            state: SessionState::Idle,
        })
    }

    #[cfg(not(target_os = "linux"))]
    pub fn open(_kinds: &[CounterKind]) -> Result<Self, BenchError> {
        Err(BenchError::CounterInit(
            "hardware counters require Linux perf_event".into(),
        ))
    }
}

#[cfg(target_os = "linux")]
fn state_err(what: &str, kind: CounterKind, e: std::io::Error) -> BenchError {
    BenchError::CounterState(format!("{} {}: {}", what, kind, e))
}

#[cfg(target_os = "linux")]
impl CounterSession for PerfCounterSession {
    fn kinds(&self) -> &[CounterKind] {
        &self.kinds
    }

    fn start(&mut self) -> Result<(), BenchError> {
        self.state.begin()?;
        for (counter, &kind) in self.counters.iter_mut().zip(&self.kinds) {
            counter.reset().map_err(|e| state_err("reset", kind, e))?;
            counter.enable().map_err(|e| state_err("enable", kind, e))?;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<CounterReadings, BenchError> {
        self.state.end()?;
        for (counter, &kind) in self.counters.iter_mut().zip(&self.kinds) {
            counter.disable().map_err(|e| state_err("disable", kind, e))?;
        }

        let mut readings = CounterReadings::new();
        for (counter, &kind) in self.counters.iter_mut().zip(&self.kinds) {
            let count = counter.read().map_err(|e| state_err("read", kind, e))?;
            readings.insert(kind, count);
        }
        Ok(readings)
    }

    fn reset(&mut self) -> Result<(), BenchError> {
        if !self.state.may_reset()? {
            return Ok(());
        }
        for (counter, &kind) in self.counters.iter_mut().zip(&self.kinds) {
            counter.reset().map_err(|e| state_err("reset", kind, e))?;
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        if self.state == SessionState::Running {
            for (counter, kind) in self.counters.iter_mut().zip(&self.kinds) {
                if let Err(e) = counter.disable() {
                    tracing::error!(%kind, error = %e, "failed to disable counter on close");
                }
            }
        }
        // Dropping a Counter closes its file descriptor.
        self.counters.clear();
        self.state = SessionState::Closed;
        tracing::debug!("perf counters closed");
    }
}

#[cfg(not(target_os = "linux"))]
impl CounterSession for PerfCounterSession {
    fn kinds(&self) -> &[CounterKind] {
        &self.kinds
    }

    fn start(&mut self) -> Result<(), BenchError> {
        self.state.begin()
    }

    fn stop(&mut self) -> Result<CounterReadings, BenchError> {
        self.state.end()?;
        Ok(CounterReadings::new())
    }

    fn reset(&mut self) -> Result<(), BenchError> {
        self.state.may_reset().map(|_| ())
    }

    fn close(&mut self) {
        self.state = SessionState::Closed;
    }
}

impl Drop for PerfCounterSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    fn open_or_skip() -> Option<PerfCounterSession> {
        match PerfCounterSession::open(&CounterKind::CACHE_MISSES) {
            Ok(session) => Some(session),
            Err(e) => {
                println!("Skipping - perf counters unavailable: {}", e);
                None
            }
        }
    }

    #[test]
    fn counts_a_region() {
        let Some(mut session) = open_or_skip() else {
            return;
        };

        session.start().unwrap();
        let data: Vec<u64> = (0..1 << 20).collect();
        let sum: u64 = data.iter().step_by(8).sum();
        std::hint::black_box(sum);
        let readings = session.stop().unwrap();

        assert!(readings.get(CounterKind::L1DataMiss).is_some());
        assert!(readings.get(CounterKind::L2DataMiss).is_some());
        session.reset().unwrap();
        session.close();
        session.close();
    }

    #[test]
    fn lifecycle_is_enforced() {
        let Some(mut session) = open_or_skip() else {
            return;
        };

        assert!(matches!(session.stop(), Err(BenchError::CounterState(_))));
        session.start().unwrap();
        assert!(matches!(session.start(), Err(BenchError::CounterState(_))));
        session.stop().unwrap();
        session.close();
        assert!(matches!(session.start(), Err(BenchError::CounterState(_))));
    }

    #[test]
    fn empty_kind_list_rejected() {
        assert!(matches!(
            PerfCounterSession::open(&[]),
            Err(BenchError::CounterInit(_))
        ));
    }
}
