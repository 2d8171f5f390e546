//! Interchangeable multiplication kernels behind one entry point.
//!
//! [`Variant`] names an algorithm; [`Kernel`] is a variant together with
//! the parameter it needs (a block size or a thread count), so a kernel
//! that can be constructed can always be run.
//!
//! Available variants:
//! - `naive`: i-j-k dot products
//! - `line`: i-k-j, row streaming
//! - `block`: i-k-j over cache tiles
//! - `parallel-outer`: i-k-j, rows shared across threads
//! - `parallel-inner`: i-k-j, columns shared across threads

use crate::blocked::tiled::matmul_blocked;
use crate::error::BenchError;
use crate::matrix::Matrix;
use crate::matrix::naive_ijk::matmul_naive_ijk;
use crate::matrix::naive_ikj::matmul_naive_ikj;
use crate::threaded::inner::matmul_parallel_inner;
use crate::threaded::outer::matmul_parallel_outer;
use crate::threaded::pool::WorkerPool;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

/// Identifier of a multiplication algorithm.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    Naive,
    Line,
    Block,
    ParallelOuter,
    ParallelInner,
}

/// Which extra parameter a variant takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    None,
    BlockSize,
    Threads,
}

impl Variant {
    pub const ALL: [Variant; 5] = [
        Variant::Naive,
        Variant::Line,
        Variant::Block,
        Variant::ParallelOuter,
        Variant::ParallelInner,
    ];

    /// Label used in result files and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Naive => "naive",
            Variant::Line => "line",
            Variant::Block => "block",
            Variant::ParallelOuter => "parallel-outer",
            Variant::ParallelInner => "parallel-inner",
        }
    }

    pub fn param_kind(self) -> ParamKind {
        match self {
            Variant::Naive | Variant::Line => ParamKind::None,
            Variant::Block => ParamKind::BlockSize,
            Variant::ParallelOuter | Variant::ParallelInner => ParamKind::Threads,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| BenchError::InvalidConfig(format!("unknown variant '{}'", s)))
    }
}

/// A variant bound to its parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    Naive,
    Line,
    Block { block_size: NonZeroUsize },
    ParallelOuter { threads: NonZeroUsize },
    ParallelInner { threads: NonZeroUsize },
}

impl Kernel {
    /// Binds `variant` to its parameter.
    ///
    /// The parameter the variant needs must be present and non-zero; the
    /// other one must be absent.
    pub fn new(
        variant: Variant,
        block_size: Option<usize>,
        threads: Option<usize>,
    ) -> Result<Self, BenchError> {
        let kind = variant.param_kind();
        if block_size.is_some() && kind != ParamKind::BlockSize {
            return Err(BenchError::InvalidConfig(format!(
                "{} takes no block size",
                variant
            )));
        }
        if threads.is_some() && kind != ParamKind::Threads {
            return Err(BenchError::InvalidConfig(format!(
                "{} takes no thread count",
                variant
            )));
        }

        Ok(match variant {
            Variant::Naive => Kernel::Naive,
            Variant::Line => Kernel::Line,
            Variant::Block => Kernel::Block {
                block_size: required(variant, "block size", block_size)?,
            },
            Variant::ParallelOuter => Kernel::ParallelOuter {
                threads: required(variant, "thread count", threads)?,
            },
            Variant::ParallelInner => Kernel::ParallelInner {
                threads: required(variant, "thread count", threads)?,
            },
        })
    }

    pub fn variant(&self) -> Variant {
        match self {
            Kernel::Naive => Variant::Naive,
            Kernel::Line => Variant::Line,
            Kernel::Block { .. } => Variant::Block,
            Kernel::ParallelOuter { .. } => Variant::ParallelOuter,
            Kernel::ParallelInner { .. } => Variant::ParallelInner,
        }
    }

    pub fn block_size(&self) -> Option<usize> {
        match self {
            Kernel::Block { block_size } => Some(block_size.get()),
            _ => None,
        }
    }

    pub fn threads(&self) -> Option<usize> {
        match self {
            Kernel::ParallelOuter { threads } | Kernel::ParallelInner { threads } => {
                Some(threads.get())
            }
            _ => None,
        }
    }

    /// C += A * B.
    ///
    /// A and B are left untouched. Parallel kernels return only after all
    /// of their workers have been joined.
    ///
    /// # Panics
    ///
    /// Panics if the three matrices differ in size.
    pub fn multiply(&self, a: &Matrix, b: &Matrix, c: &mut Matrix) {
        let n = a.dim();
        assert_eq!(b.dim(), n, "B: expected {}x{}", n, n);
        assert_eq!(c.dim(), n, "C: expected {}x{}", n, n);

        let (a, b) = (a.as_slice(), b.as_slice());
        let c = c.as_mut_slice();

        match *self {
            Kernel::Naive => matmul_naive_ijk(a, b, c, n),
            Kernel::Line => matmul_naive_ikj(a, b, c, n),
            Kernel::Block { block_size } => matmul_blocked(a, b, c, n, block_size.get()),
            Kernel::ParallelOuter { threads } => {
                matmul_parallel_outer(a, b, c, n, &WorkerPool::with_threads(threads))
            }
            Kernel::ParallelInner { threads } => {
                matmul_parallel_inner(a, b, c, n, &WorkerPool::with_threads(threads))
            }
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kernel::Block { block_size } => write!(f, "{} (block {})", self.variant(), block_size),
            Kernel::ParallelOuter { threads } | Kernel::ParallelInner { threads } => {
                write!(f, "{} ({} threads)", self.variant(), threads)
            }
            _ => write!(f, "{}", self.variant()),
        }
    }
}

fn required(variant: Variant, what: &str, value: Option<usize>) -> Result<NonZeroUsize, BenchError> {
    let value = value.ok_or_else(|| {
        BenchError::InvalidConfig(format!("{} requires a {}", variant, what))
    })?;
    NonZeroUsize::new(value)
        .ok_or_else(|| BenchError::InvalidConfig(format!("{} for {} must be at least 1", what, variant)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for v in Variant::ALL {
            assert_eq!(v.as_str().parse::<Variant>().unwrap(), v);
        }
        assert!("strassen".parse::<Variant>().is_err());
    }

    #[test]
    fn parameters_are_checked() {
        assert!(Kernel::new(Variant::Naive, None, None).is_ok());
        assert!(Kernel::new(Variant::Naive, Some(4), None).is_err());
        assert!(Kernel::new(Variant::Line, None, Some(2)).is_err());
        assert!(Kernel::new(Variant::Block, None, None).is_err());
        assert!(Kernel::new(Variant::Block, Some(0), None).is_err());
        assert!(Kernel::new(Variant::ParallelOuter, None, Some(0)).is_err());
        assert!(Kernel::new(Variant::ParallelInner, Some(64), Some(2)).is_err());

        let k = Kernel::new(Variant::Block, Some(64), None).unwrap();
        assert_eq!(k.block_size(), Some(64));
        assert_eq!(k.threads(), None);

        let k = Kernel::new(Variant::ParallelInner, None, Some(8)).unwrap();
        assert_eq!(k.variant(), Variant::ParallelInner);
        assert_eq!(k.threads(), Some(8));
        assert_eq!(k.to_string(), "parallel-inner (8 threads)");
    }

    #[test]
    #[should_panic(expected = "B: expected")]
    fn mismatched_operands_panic() {
        let a = Matrix::try_ones(3).unwrap();
        let b = Matrix::try_ones(2).unwrap();
        let mut c = Matrix::try_zeroed(3).unwrap();
        Kernel::Naive.multiply(&a, &b, &mut c);
    }
}
