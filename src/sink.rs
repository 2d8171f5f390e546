//! Delimited-text output of trial results.

use crate::error::BenchError;
use crate::runner::TrialResult;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Column names, in record order.
pub const CSV_HEADER: &str = "Method,MatrixSize,BlockSize,Time(s),GFLOPS,L1_DCM,L2_DCM,NumThreads";

/// Consumer of trial results, fed in sweep order.
pub trait ResultSink {
    fn record(&mut self, result: &TrialResult) -> Result<(), BenchError>;
}

impl ResultSink for Vec<TrialResult> {
    fn record(&mut self, result: &TrialResult) -> Result<(), BenchError> {
        self.push(result.clone());
        Ok(())
    }
}

/// Writes one CSV line per result and flushes after each, so an
/// interrupted sweep still leaves a well-formed file.
pub struct CsvSink<W: Write> {
    writer: W,
}

impl CsvSink<BufWriter<File>> {
    /// Creates (or truncates) `path`, creating missing parent directories.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, BenchError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        tracing::debug!(path = %path.display(), "result file opened");
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> CsvSink<W> {
    /// Wraps `writer` and emits the header line.
    pub fn new(mut writer: W) -> Result<Self, BenchError> {
        writeln!(writer, "{}", CSV_HEADER)?;
        writer.flush()?;
        Ok(Self { writer })
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for CsvSink<W> {
    fn record(&mut self, r: &TrialResult) -> Result<(), BenchError> {
        writeln!(
            self.writer,
            "{},{},{},{},{},{},{},{}",
            r.variant,
            r.size,
            or_na(r.block_size),
            r.elapsed_secs,
            r.gflops,
            or_na(r.l1_misses),
            or_na(r.l2_misses),
            or_na(r.threads),
        )?;
        self.writer.flush()?;
        Ok(())
    }
}

fn or_na<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "NA".to_string(), |v| v.to_string())
}
