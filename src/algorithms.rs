//! Triangle counting kernels and the controller driving the whole pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TcError;

pub mod bitmap;
pub mod merge;
pub mod packed;
pub mod radix;
pub mod reference;
pub mod triangle;
pub mod view;

pub use reference::count_triangles_reference;
pub use triangle::{count_triangles, count_with_strategy, TriangleController, TriangleReport};
pub use view::{KernelStats, OrientedView, PackedRows, PackedWord};

/// Counting kernel, selected once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelStrategy {
    /// Dense bitmap of `n` bits per worker.
    Bitmap,
    /// Precomputed word masks below the packing threshold, bitmap above it.
    PackedBitmap,
    /// Radix hash set over the forward range.
    RadixHash,
    /// Direct SIMD merge of forward ranges.
    Merge,
    /// Precomputed word masks below the packing threshold, SIMD merge above it.
    PackedMerge,
    /// Edge-parallel bitmap counting over global adjacency indices.
    EdgeBitmap,
}

impl KernelStrategy {
    pub const ALL: [KernelStrategy; 6] = [
        KernelStrategy::Bitmap,
        KernelStrategy::PackedBitmap,
        KernelStrategy::RadixHash,
        KernelStrategy::Merge,
        KernelStrategy::PackedMerge,
        KernelStrategy::EdgeBitmap,
    ];

    pub fn name(self) -> &'static str {
        match self {
            KernelStrategy::Bitmap => "bitmap",
            KernelStrategy::PackedBitmap => "packed_bitmap",
            KernelStrategy::RadixHash => "radix_hash",
            KernelStrategy::Merge => "merge",
            KernelStrategy::PackedMerge => "packed_merge",
            KernelStrategy::EdgeBitmap => "edge_bitmap",
        }
    }
}

impl fmt::Display for KernelStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KernelStrategy {
    type Err = TcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        KernelStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == normalized)
            .ok_or_else(|| TcError::UnknownStrategy(s.to_owned()))
    }
}

#[cfg(test)]
mod test_strategy {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for strategy in KernelStrategy::ALL {
            assert_eq!(strategy.name().parse::<KernelStrategy>().unwrap(), strategy);
        }
        assert_eq!("Packed-Merge".parse::<KernelStrategy>().unwrap(), KernelStrategy::PackedMerge);
        assert!(matches!("simd".parse::<KernelStrategy>(), Err(TcError::UnknownStrategy(_))));
    }
}
