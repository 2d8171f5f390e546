//! Cache-blocked GEMM.
//!
//! Splits the j and k loops into `block_size` tiles so that the slice of
//! B touched by one tile stays resident in cache while every row of A
//! streams past it.

pub mod tiled;
