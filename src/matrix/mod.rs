//! Square operand matrices and the unblocked kernels.
//!
//! [`Matrix`] owns a contiguous row-major buffer. Allocation is fallible
//! so an oversized trial surfaces as [`BenchError::Allocation`] instead
//! of aborting the process.

pub mod naive_ijk;
pub mod naive_ikj;

use crate::error::BenchError;
use std::ops::{Index, IndexMut};

/// How many leading elements of row 0 are kept for eyeballing results.
pub const SAMPLE_LEN: usize = 10;

/// Dense N×N matrix of `f64`, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Vec<f64>,
    n: usize,
}

impl Matrix {
    /// N×N matrix of zeros.
    pub fn try_zeroed(n: usize) -> Result<Self, BenchError> {
        Self::try_from_fn(n, |_, _| 0.0)
    }

    /// N×N matrix with every element set to 1.0 (operand A).
    pub fn try_ones(n: usize) -> Result<Self, BenchError> {
        Self::try_from_fn(n, |_, _| 1.0)
    }

    /// N×N matrix whose row `i` is filled with `i + 1` (operand B).
    pub fn try_row_ramp(n: usize) -> Result<Self, BenchError> {
        Self::try_from_fn(n, |i, _| (i + 1) as f64)
    }

    /// N×N matrix with element `(i, j)` set to `f(i, j)`.
    pub fn try_from_fn<F>(n: usize, f: F) -> Result<Self, BenchError>
    where
        F: Fn(usize, usize) -> f64,
    {
        let len = n
            .checked_mul(n)
            .ok_or(BenchError::Allocation { size: n })?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| BenchError::Allocation { size: n })?;

        for i in 0..n {
            for j in 0..n {
                data.push(f(i, j));
            }
        }

        Ok(Self { data, n })
    }

    /// Side length N.
    pub fn dim(&self) -> usize {
        self.n
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Row `i` as a slice of length N.
    ///
    /// # Panics
    ///
    /// Panics if `i >= N`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// Up to [`SAMPLE_LEN`] leading elements of row 0.
    pub fn sample(&self) -> &[f64] {
        &self.data[..self.n.min(SAMPLE_LEN)]
    }

    fn offset(&self, (i, j): (usize, usize)) -> usize {
        assert!(
            i < self.n && j < self.n,
            "index ({}, {}) out of bounds for {}x{} matrix",
            i,
            j,
            self.n,
            self.n
        );
        i * self.n + j
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, idx: (usize, usize)) -> &f64 {
        &self.data[self.offset(idx)]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, idx: (usize, usize)) -> &mut f64 {
        let off = self.offset(idx);
        &mut self.data[off]
    }
}
