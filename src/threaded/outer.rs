//! Row-parallel line-order multiplication.

use crate::matrix::naive_ikj::accumulate_row_ikj;
use crate::threaded::pool::WorkerPool;

/// Line-order (i-k-j) multiplication with the outer `i` loop shared
/// across the pool.
///
/// Each worker owns a contiguous band of rows of C, so no two workers
/// ever write the same element and no synchronisation is needed until
/// the final join.
///
/// # Arguments
///
/// * `a` - Matrix A (n × n), row-major
/// * `b` - Matrix B (n × n), row-major
/// * `c` - Matrix C (n × n), row-major, accumulated into (C += A * B)
/// * `n` - Side length
/// * `pool` - Workers to fan out across
pub fn matmul_parallel_outer(a: &[f64], b: &[f64], c: &mut [f64], n: usize, pool: &WorkerPool) {
    pool.scatter_rows(c, n, |i, c_row| accumulate_row_ikj(a, b, c_row, i, n));
}
