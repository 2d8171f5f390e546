//! Multi-threaded line-order multiplication.
//!
//! Both kernels run the i-k-j loop nest of the line-order variant and
//! differ only in which loop is shared out:
//! - `outer`: bands of rows (the `i` loop), one band per worker
//! - `inner`: stripes of columns (the `j` loop), workers in lock-step per `(i, k)` step
//!
//! Threads come from a [`WorkerPool`](pool::WorkerPool) that joins every
//! worker before returning.

pub mod inner;
pub mod outer;
pub mod pool;
