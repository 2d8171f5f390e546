//! Error taxonomy for sweeps and trials.

use thiserror::Error;

/// Errors raised while configuring, measuring or recording trials.
#[derive(Debug, Error)]
pub enum BenchError {
    /// The counter facility is unavailable or a counter kind is unsupported.
    #[error("counter initialisation failed: {0}")]
    CounterInit(String),

    /// start/stop/reset were called out of order.
    #[error("counter session misuse: {0}")]
    CounterState(String),

    /// The three N×N operand buffers could not be allocated.
    #[error("cannot allocate operands for {size}x{size} matrices")]
    Allocation { size: usize },

    /// The result stream could not be opened or written.
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    /// A size, block size or thread count is out of range, or a parameter is missing.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be read or parsed.
    #[error("config file error: {0}")]
    Config(String),
}

impl BenchError {
    /// Whether the sweep may skip the failing trial and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BenchError::Allocation { .. })
    }
}
