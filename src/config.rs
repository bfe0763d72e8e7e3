use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::algorithms::KernelStrategy;
use crate::error::{TcError, TcResult};
use crate::types::Orientation;

/// Number of `u32` slots in one cache line, the smallest bucket write-ahead buffer.
pub const CACHE_LINE_ENTRY: usize = 16;

/// Per-worker memory budget (bytes) shared by all bucket write-ahead buffers.
pub const DEFAULT_LOCAL_BUDGET: usize = 8 * 1024 * 1024;

/// Vertex ids in `[0, DEFAULT_PACK_THRESHOLD)` are word-packed by the packed kernels.
pub const DEFAULT_PACK_THRESHOLD: u32 = 32768;

/// Vertices handed to a worker per scheduling step in the counting loops.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Radix table size multiplier over the largest power of two not above the row length.
pub const RADIX_HEURISTIC_FACTOR: usize = 64;

/// Buffer size for text edge list reading.
pub const READ_BUFFER_SIZE: usize = 4 * 1024 * 1024;

/// A range this many times longer than the other is intersected by galloping instead of merging.
pub const GALLOP_SKEW_RATIO: usize = 32;

/// Runtime configuration of one triangle counting run.
///
/// Every field has a default, so a YAML file only needs to name what it changes:
///
/// ```yaml
/// thread_num: 8
/// strategy: packed_merge
/// orientation: dodg
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Worker threads, `0` means hardware concurrency.
    pub thread_num: usize,

    /// Kernel used for the counting phase.
    pub strategy: KernelStrategy,

    /// Build a symmetric CSR or a degree-oriented DAG.
    pub orientation: Orientation,

    /// Relabel vertices by non-increasing degree before counting.
    pub reorder: bool,

    /// Exclusive upper bound of the word-packed vertex id range.
    pub pack_threshold: u32,

    /// Vertices per dynamic scheduling chunk.
    pub chunk_size: usize,

    /// Memory budget per worker for buffered bucket sort.
    pub local_budget_bytes: usize,

    /// Keep the final graph and permutation in the report.
    pub keep_graph: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            thread_num: 0,
            strategy: KernelStrategy::PackedMerge,
            orientation: Orientation::DegreeOriented,
            reorder: true,
            pack_threshold: DEFAULT_PACK_THRESHOLD,
            chunk_size: DEFAULT_CHUNK_SIZE,
            local_budget_bytes: DEFAULT_LOCAL_BUDGET,
            keep_graph: false,
        }
    }
}

impl RunConfig {
    /// Reads a configuration from a YAML file. Missing keys fall back to defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> TcResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Parses a configuration from YAML text and validates it.
    pub fn from_yaml_str(text: &str) -> TcResult<Self> {
        let config: RunConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the pipeline cannot run with.
    pub fn validate(&self) -> TcResult<()> {
        if self.chunk_size == 0 {
            return Err(TcError::InvalidConfig("chunk_size must be positive".to_owned()));
        }
        if self.pack_threshold == 0 {
            return Err(TcError::InvalidConfig("pack_threshold must be positive".to_owned()));
        }
        if self.local_budget_bytes == 0 {
            return Err(TcError::InvalidConfig("local_budget_bytes must be positive".to_owned()));
        }
        Ok(())
    }

    /// Number of workers the thread pool is built with.
    pub fn effective_threads(&self) -> usize {
        if self.thread_num == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.thread_num
        }
    }

    /// Exclusive bound of packed ids for a graph of `vertex_count` vertices.
    ///
    /// The threshold is clamped to the vertex count, so a threshold above `n` packs every
    /// vertex, and then rounded up to a whole number of 64-bit words.
    pub fn packed_range(&self, vertex_count: usize) -> usize {
        (self.pack_threshold as usize).min(vertex_count).div_ceil(64) * 64
    }
}
