//! Instrumented dense matrix multiplication benchmark.
//!
//! Runs square matrix products under several kernels (naive, line-order,
//! cache-blocked and two multi-threaded variants) across a sweep of
//! sizes. Each trial is bracketed by a hardware counter window, so every
//! result carries wall-clock time, GFLOPS, and L1/L2 data-cache misses.
//!
//! ## Usage
//!
//! ```
//! use matbench::counters::{CounterKind, ScriptedCounters};
//! use matbench::kernels::Kernel;
//! use matbench::runner::{TrialSpec, run_trial};
//!
//! // A real sweep would open a PerfCounterSession instead.
//! let mut session = ScriptedCounters::new(&CounterKind::CACHE_MISSES, 0);
//! let result = run_trial(&TrialSpec::new(Kernel::Line, 4), &mut session).unwrap();
//!
//! // A is all ones and row p of B is p + 1, so every C[i][j] = N(N+1)/2.
//! assert_eq!(result.sample, vec![10.0; 4]);
//! ```
//!
//! A whole sweep streams its results into a [`sink::ResultSink`]:
//!
//! ```
//! use matbench::counters::{CounterKind, ScriptedCounters};
//! use matbench::kernels::Variant;
//! use matbench::sink::CsvSink;
//! use matbench::sweep::{SweepPlan, run_sweep};
//!
//! let plan = SweepPlan {
//!     small_sizes: vec![8, 16],
//!     large_sizes: vec![32],
//!     block_sizes: vec![8],
//!     thread_counts: vec![2],
//!     variants: Variant::ALL.to_vec(),
//! };
//! let mut session = ScriptedCounters::new(&CounterKind::CACHE_MISSES, 0);
//! let mut sink = CsvSink::new(Vec::new()).unwrap();
//!
//! let outcome = run_sweep(&plan, &mut session, &mut sink).unwrap();
//! assert_eq!(outcome.results.len(), 9);
//! ```
//!
//! ## What's inside
//!
//! - Owned, bounds-checked N×N matrices with fallible allocation
//! - Five kernels behind one `Kernel::multiply`
//! - A scoped fork/join worker pool for the threaded kernels
//! - `perf_event` backed L1/L2 cache-miss counters (Linux)
//! - CSV output flushed after every trial

pub mod blocked;
pub mod config;
pub mod counters;
pub mod error;
pub mod interactive;
pub mod kernels;
pub mod matrix;
pub mod runner;
pub mod sink;
pub mod sweep;
pub mod threaded;

pub use error::BenchError;
pub use kernels::{Kernel, Variant};
pub use matrix::Matrix;
pub use runner::{TrialResult, TrialSpec, gflops, run_trial};
pub use sweep::{SweepOutcome, SweepPlan, run_sweep};
