/// Line-order matrix multiplication using i-k-j loop order.
///
/// Swapping the j and k loops makes the innermost loop stream through a
/// row of B and a row of C with stride 1. Same arithmetic as
/// [`matmul_naive_ijk`](super::naive_ijk::matmul_naive_ijk), far fewer
/// cache misses once a column of B no longer fits in L1.
///
/// # Arguments
///
/// * `a` - Matrix A (n × n), row-major
/// * `b` - Matrix B (n × n), row-major
/// * `c` - Matrix C (n × n), row-major, accumulated into (C += A * B)
/// * `n` - Side length
pub fn matmul_naive_ikj(a: &[f64], b: &[f64], c: &mut [f64], n: usize) {
    for i in 0..n {
        accumulate_row_ikj(a, b, &mut c[i * n..(i + 1) * n], i, n);
    }
}

/// `C[i][..] += A[i][..] * B` for a single row, in i-k-j order.
///
/// Shared with the row-parallel kernel, where each worker owns a band of
/// rows of C.
pub(crate) fn accumulate_row_ikj(a: &[f64], b: &[f64], c_row: &mut [f64], i: usize, n: usize) {
    for p in 0..n {
        let a_ip = a[i * n + p];
        let b_row = &b[p * n..(p + 1) * n];
        for (c_ij, &b_pj) in c_row.iter_mut().zip(b_row) {
            *c_ij += a_ip * b_pj;
        }
    }
}
