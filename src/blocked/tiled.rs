//! Tiled i-k-j multiplication.

/// Cache-blocked matrix multiplication.
///
/// The outer two loops walk `block_size`-wide column tiles of C (x) and
/// row tiles of B (y). Inside a tile pair the kernel runs the i-k-j loop
/// of the line-order variant over every row of A. Edge tiles are clipped
/// when `block_size` does not divide `n`.
///
/// With `block_size >= n` there is exactly one tile pair and the loop
/// nest, including the summation order, is the line-order kernel's.
///
/// # Arguments
///
/// * `a` - Matrix A (n × n), row-major
/// * `b` - Matrix B (n × n), row-major
/// * `c` - Matrix C (n × n), row-major, accumulated into (C += A * B)
/// * `n` - Side length
/// * `block_size` - Tile edge, must be at least 1
///
/// # Panics
///
/// Panics if `block_size` is zero.
pub fn matmul_blocked(a: &[f64], b: &[f64], c: &mut [f64], n: usize, block_size: usize) {
    assert!(block_size > 0, "block size must be at least 1");

    for x in (0..n).step_by(block_size) {
        let x_end = (x + block_size).min(n);
        for y in (0..n).step_by(block_size) {
            let y_end = (y + block_size).min(n);
            for i in 0..n {
                let c_tile = &mut c[i * n + x..i * n + x_end];
                for p in y..y_end {
                    let a_ip = a[i * n + p];
                    let b_tile = &b[p * n + x..p * n + x_end];
                    for (c_ij, &b_pj) in c_tile.iter_mut().zip(b_tile) {
                        *c_ij += a_ip * b_pj;
                    }
                }
            }
        }
    }
}
