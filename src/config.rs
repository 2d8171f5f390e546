//! Configuration loading from `matbench.toml`.
//!
//! The file is optional. It is discovered by walking up from the current
//! directory; every missing field falls back to the built-in sweep.

use crate::error::BenchError;
use crate::kernels::Variant;
use crate::sweep::SweepPlan;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up by [`BenchConfig::discover`].
pub const CONFIG_FILE: &str = "matbench.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchConfig {
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Configuration space of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Sizes for the unblocked and threaded variants
    #[serde(default = "default_small_sizes")]
    pub small_sizes: Vec<usize>,
    /// Sizes for the blocked variant
    #[serde(default = "default_large_sizes")]
    pub large_sizes: Vec<usize>,
    #[serde(default = "default_block_sizes")]
    pub block_sizes: Vec<usize>,
    #[serde(default = "default_thread_counts")]
    pub thread_counts: Vec<usize>,
    #[serde(default = "default_variants")]
    pub variants: Vec<Variant>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            small_sizes: default_small_sizes(),
            large_sizes: default_large_sizes(),
            block_sizes: default_block_sizes(),
            thread_counts: default_thread_counts(),
            variants: default_variants(),
        }
    }
}

/// Where results go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_small_sizes() -> Vec<usize> {
    (600..=3000).step_by(400).collect()
}
fn default_large_sizes() -> Vec<usize> {
    (4096..=10240).step_by(2048).collect()
}
fn default_block_sizes() -> Vec<usize> {
    vec![128, 256, 512, 1024]
}
fn default_thread_counts() -> Vec<usize> {
    vec![2, 4, 8, 12]
}
fn default_variants() -> Vec<Variant> {
    Variant::ALL.to_vec()
}
fn default_output_path() -> PathBuf {
    PathBuf::from("data/benchmark_results.csv")
}

impl BenchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BenchError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| BenchError::Config(format!("{}: {}", path.display(), e)))?;
        Self::parse(&content).map_err(|e| match e {
            BenchError::Config(msg) => BenchError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, BenchError> {
        toml::from_str(content).map_err(|e| BenchError::Config(e.to_string()))
    }

    /// Walk up from the current directory looking for [`CONFIG_FILE`].
    pub fn discover() -> Option<PathBuf> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// The sweep described by this configuration.
    pub fn plan(&self) -> SweepPlan {
        SweepPlan {
            small_sizes: self.sweep.small_sizes.clone(),
            large_sizes: self.sweep.large_sizes.clone(),
            block_sizes: self.sweep.block_sizes.clone(),
            thread_counts: self.sweep.thread_counts.clone(),
            variants: self.sweep.variants.clone(),
        }
    }

    /// Default configuration as a commented TOML document
    pub fn default_toml() -> String {
        r#"# matbench configuration

[sweep]
# Sizes for naive, line and both parallel variants
small_sizes = [600, 1000, 1400, 1800, 2200, 2600, 3000]
# Sizes for the blocked variant
large_sizes = [4096, 6144, 8192, 10240]
# Tile edges for the blocked variant
block_sizes = [128, 256, 512, 1024]
# Worker counts for the parallel variants
thread_counts = [2, 4, 8, 12]
# Any of: naive, line, block, parallel-outer, parallel-inner
variants = ["naive", "line", "block", "parallel-outer", "parallel-inner"]

[output]
# CSV file, truncated at the start of every sweep
path = "data/benchmark_results.csv"
"#
        .to_string()
    }
}
