//! Bounded fork/join worker pool.
//!
//! Every call spawns at most `threads` scoped workers and returns only
//! after all of them have been joined, so the caller's measurement
//! window always covers the complete parallel region including fork and
//! join.

use crate::error::BenchError;
use std::num::NonZeroUsize;
use std::sync::Barrier;
use std::thread;

/// Fixed-width fork/join pool over the rows or columns of an N×N buffer.
///
/// `threads` is an upper bound. A call never spawns more workers than
/// there are rows, and column stripes are rounded to equal widths, so
/// e.g. 6 threads over 10 columns runs 5 workers of 2 columns each.
/// Narrowing is logged at debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    threads: NonZeroUsize,
}

impl WorkerPool {
    /// Pool of `threads` workers. Zero is rejected.
    pub fn new(threads: usize) -> Result<Self, BenchError> {
        NonZeroUsize::new(threads)
            .map(|threads| Self { threads })
            .ok_or_else(|| BenchError::InvalidConfig("thread count must be at least 1".into()))
    }

    pub fn with_threads(threads: NonZeroUsize) -> Self {
        Self { threads }
    }

    pub fn threads(&self) -> usize {
        self.threads.get()
    }

    /// Workers [`scatter_rows`](Self::scatter_rows) spawns for `n` rows.
    pub fn row_workers(&self, n: usize) -> usize {
        self.threads().min(n)
    }

    /// Stripe width and worker count [`scatter_columns`](Self::scatter_columns)
    /// uses for `n` columns. Zero workers when `n` is zero.
    pub fn column_stripes(&self, n: usize) -> (usize, usize) {
        if n == 0 {
            return (0, 0);
        }
        let width = n.div_ceil(self.threads().min(n));
        (width, n.div_ceil(width))
    }

    fn log_narrowed(&self, workers: usize, n: usize) {
        if workers < self.threads() {
            tracing::debug!(
                requested = self.threads(),
                spawned = workers,
                n,
                "fewer workers than requested"
            );
        }
    }

    /// Splits the rows of `data` (N×N, row-major) into contiguous bands,
    /// one per worker, and calls `work(i, row_i)` for every row of a band
    /// on that band's worker.
    ///
    /// Bands differ in height by at most one row. At most N workers are
    /// spawned.
    pub fn scatter_rows<F>(&self, data: &mut [f64], n: usize, work: F)
    where
        F: Fn(usize, &mut [f64]) + Sync,
    {
        if n == 0 {
            return;
        }
        debug_assert_eq!(data.len(), n * n);

        let workers = self.row_workers(n);
        self.log_narrowed(workers, n);
        let base = n / workers;
        let extra = n % workers;
        let work = &work;

        thread::scope(|scope| {
            let mut rest = data;
            let mut first_row = 0;
            for tid in 0..workers {
                let rows = base + usize::from(tid < extra);
                let (band, tail) = std::mem::take(&mut rest).split_at_mut(rows * n);
                rest = tail;
                let start = first_row;
                first_row += rows;

                scope.spawn(move || {
                    for (offset, row) in band.chunks_mut(n).enumerate() {
                        work(start + offset, row);
                    }
                });
            }
        });
    }

    /// Splits every row of `data` (N×N, row-major) into column stripes,
    /// one per worker. Workers walk the `(i, k)` steps of an N×N product
    /// in lock-step: each calls `work(i, k, first_col, stripe)` for its
    /// stripe of row `i`, then waits on a barrier until every worker has
    /// finished step `(i, k)`. That is N² barrier waits per call.
    ///
    /// At most N workers are spawned.
    pub fn scatter_columns<F>(&self, data: &mut [f64], n: usize, work: F)
    where
        F: Fn(usize, usize, usize, &mut [f64]) + Sync,
    {
        if n == 0 {
            return;
        }
        debug_assert_eq!(data.len(), n * n);

        let (width, workers) = self.column_stripes(n);
        self.log_narrowed(workers, n);

        let mut stripes: Vec<Vec<&mut [f64]>> =
            (0..workers).map(|_| Vec::with_capacity(n)).collect();
        for row in data.chunks_mut(n) {
            for (tid, stripe) in row.chunks_mut(width).enumerate() {
                stripes[tid].push(stripe);
            }
        }

        let barrier = Barrier::new(workers);
        let barrier = &barrier;
        let work = &work;

        thread::scope(|scope| {
            for (tid, rows) in stripes.into_iter().enumerate() {
                scope.spawn(move || {
                    for (i, stripe) in rows.into_iter().enumerate() {
                        for k in 0..n {
                            work(i, k, tid * width, stripe);
                            barrier.wait();
                        }
                    }
                });
            }
        });
    }
}
