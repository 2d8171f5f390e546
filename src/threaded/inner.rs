//! Column-parallel line-order multiplication.

use crate::threaded::pool::WorkerPool;

/// Line-order (i-k-j) multiplication with the innermost `j` loop shared
/// across the pool.
///
/// Every worker owns a stripe of columns and the pool holds all workers
/// at a barrier after each `(i, k)` step. The work per synchronisation
/// point is one stripe of one row update, which makes this the variant
/// where fork/join and barrier overhead is most visible.
///
/// # Arguments
///
/// * `a` - Matrix A (n × n), row-major
/// * `b` - Matrix B (n × n), row-major
/// * `c` - Matrix C (n × n), row-major, accumulated into (C += A * B)
/// * `n` - Side length
/// * `pool` - Workers to fan out across
pub fn matmul_parallel_inner(a: &[f64], b: &[f64], c: &mut [f64], n: usize, pool: &WorkerPool) {
    pool.scatter_columns(c, n, |i, p, first_col, stripe| {
        let a_ip = a[i * n + p];
        let b_part = &b[p * n + first_col..p * n + first_col + stripe.len()];
        for (c_ij, &b_pj) in stripe.iter_mut().zip(b_part) {
            *c_ij += a_ip * b_pj;
        }
    });
}
