use rayon::prelude::*;

use crate::primitives::select_not_f;
use crate::types::{EdgeList, VertexId};

/// Result of [`dedup_edges`].
///
/// # Fields
/// * `edges` - Strictly sorted canonical edges without self-loops.
/// * `max_vertex_id` - Largest id seen in the raw input, self-loops and duplicates included;
///   `None` for an empty input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deduplicated {
    pub edges: EdgeList,
    pub max_vertex_id: Option<VertexId>,
}

impl Deduplicated {
    /// Vertex count `max_vertex_id + 1`, zero for an empty input.
    pub fn vertex_count(&self) -> usize {
        self.max_vertex_id.map_or(0, |max_id| max_id as usize + 1)
    }
}

/// Normalizes a raw edge list into a simple undirected edge set.
///
/// # Algorithm
///
/// 1. Canonicalize every edge to `src <= dst` while reducing the maximum vertex id.
/// 2. Parallel sort by `(src, dst)`.
/// 3. Compact away self-loops and every entry equal to its predecessor.
///
/// The input buffer is consumed; the compacted output is a new buffer.
pub fn dedup_edges(edges: EdgeList) -> Deduplicated {
    let mut edges = edges.into_inner();

    // Step 1. Canonicalize and find the largest id.
    let max_vertex_id = edges
        .par_iter_mut()
        .map(|edge| {
            *edge = edge.canonical();
            edge.dst
        })
        .max();

    // Step 2. Sort.
    edges.par_sort_unstable();

    // Step 3. Drop self-loops and repeats.
    let compacted = select_not_f(&edges, |i| {
        edges[i].is_self_loop() || (i > 0 && edges[i - 1] == edges[i])
    });

    Deduplicated {
        edges: EdgeList::new(compacted),
        max_vertex_id,
    }
}

/// Whether `edges` is strictly sorted with `src < dst` everywhere.
pub fn verify_canonical(edges: &EdgeList) -> bool {
    let slice = edges.as_slice();
    slice.par_iter().all(|e| e.src < e.dst) && slice.par_windows(2).all(|w| w[0] < w[1])
}
