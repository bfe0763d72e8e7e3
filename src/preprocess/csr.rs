use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::primitives::{inclusive_prefix_sum_into, worker_ranges, SharedSlice};
use crate::types::{Edge, EdgeList, Graph, Orientation, VertexId};

/// Worker-local byte counters in front of a shared atomic histogram.
///
/// A counter is pushed to the shared slot only when it reaches `u8::MAX`, cutting atomic
/// traffic by about that factor on skewed inputs.
pub(crate) struct ByteCounter<'a> {
    local: Vec<u8>,
    shared: &'a [AtomicU32],
}

impl<'a> ByteCounter<'a> {
    fn new(shared: &'a [AtomicU32]) -> Self {
        Self {
            local: vec![0u8; shared.len()],
            shared,
        }
    }

    #[inline]
    pub(crate) fn bump(&mut self, v: VertexId) {
        let v = v as usize;
        self.local[v] += 1;
        if self.local[v] == u8::MAX {
            self.shared[v].fetch_add(u8::MAX as u32, Ordering::Relaxed);
            self.local[v] = 0;
        }
    }

    fn flush(self) {
        for (v, &c) in self.local.iter().enumerate() {
            if c > 0 {
                self.shared[v].fetch_add(c as u32, Ordering::Relaxed);
            }
        }
    }
}

/// Per-vertex histogram over `edges`; `visit` bumps the vertices an edge counts toward.
pub(crate) fn edge_histogram<F>(edges: &[Edge], vertex_count: usize, visit: F) -> Vec<u32>
where
    F: Fn(&Edge, &mut ByteCounter<'_>) + Sync,
{
    let shared: Vec<AtomicU32> = (0..vertex_count).map(|_| AtomicU32::new(0)).collect();
    if !edges.is_empty() {
        worker_ranges(edges.len(), rayon::current_num_threads())
            .into_par_iter()
            .for_each(|range| {
                let mut counter = ByteCounter::new(&shared);
                for edge in &edges[range] {
                    visit(edge, &mut counter);
                }
                counter.flush();
            });
    }
    shared.into_iter().map(AtomicU32::into_inner).collect()
}

/// `n + 1` offsets from per-vertex row lengths.
pub(crate) fn offsets_from_lengths(lengths: &[u32]) -> Vec<usize> {
    let mut row_ptrs = vec![0usize; lengths.len() + 1];
    inclusive_prefix_sum_into(&mut row_ptrs[1..], |u| lengths[u] as usize);
    row_ptrs
}

/// Scatters adjacency entries into their rows, claiming slots through per-row cursors.
///
/// `emit` calls its sink once per `(row, neighbor)` entry an edge contributes.
pub(crate) fn scatter_rows<F>(edges: &[Edge], row_ptrs: &[usize], emit: F) -> Vec<VertexId>
where
    F: Fn(&Edge, &mut dyn FnMut(VertexId, VertexId)) + Sync,
{
    let n = row_ptrs.len() - 1;
    let mut adj = vec![0 as VertexId; row_ptrs[n]];
    let cursors: Vec<AtomicUsize> = row_ptrs[..n].iter().map(|&p| AtomicUsize::new(p)).collect();
    {
        let view = SharedSlice::new(&mut adj);
        edges.par_iter().with_min_len(1024).for_each(|edge| {
            emit(edge, &mut |row, neighbor| {
                let slot = cursors[row as usize].fetch_add(1, Ordering::Relaxed);
                // SAFETY: fetch_add hands out every slot of the row once.
                unsafe { view.write(slot, neighbor) };
            });
        });
    }
    let filled = cursors
        .par_iter()
        .enumerate()
        .all(|(u, cursor)| cursor.load(Ordering::Relaxed) == row_ptrs[u + 1]);
    assert!(filled, "every row cursor must end at the next row offset");
    adj
}

/// Degree of every vertex in a deduplicated edge list, counting both endpoints.
pub fn degrees_of(edges: &EdgeList, vertex_count: usize) -> Vec<u32> {
    edge_histogram(edges.as_slice(), vertex_count, |edge, counter| {
        counter.bump(edge.src);
        counter.bump(edge.dst);
    })
}

/// Builds a symmetric CSR: both directions of every edge are materialized.
///
/// Degree histogram, prefix sum of the degrees into `row_ptrs`, then one slot claimed per
/// endpoint per edge. Rows come out in scheduling order; sort them before intersecting.
///
/// # Panics
/// If an endpoint is `>= vertex_count`, or if `row_ptrs[n] != 2|E|`.
pub fn build_csr(edges: &EdgeList, vertex_count: usize) -> Graph {
    let slice = edges.as_slice();

    // Step 1. Degrees.
    let degrees = degrees_of(edges, vertex_count);

    // Step 2. Offsets.
    let row_ptrs = offsets_from_lengths(&degrees);
    assert_eq!(
        row_ptrs[vertex_count],
        2 * slice.len(),
        "symmetric CSR must hold 2|E| adjacency entries"
    );

    // Step 3. Scatter both directions.
    let adj = scatter_rows(slice, &row_ptrs, |edge, sink| {
        sink(edge.src, edge.dst);
        sink(edge.dst, edge.src);
    });

    Graph::from_parts(row_ptrs, adj, Orientation::Symmetric)
}

#[cfg(test)]
mod test_csr {
    use super::*;
    use crate::preprocess::dedup::dedup_edges;
    use crate::types::graph_query::GraphQuery;

    #[test]
    fn test_triangle_with_tail() {
        let dedup = dedup_edges(EdgeList::from_pairs([(0, 1), (1, 2), (2, 0), (0, 3)]));
        let mut graph = build_csr(&dedup.edges, dedup.vertex_count());
        assert_eq!(graph.row_ptrs, vec![0, 3, 5, 7, 8]);
        graph.sort_rows();
        assert_eq!(graph.neighbors(0), &[1, 2, 3]);
        assert_eq!(graph.neighbors(1), &[0, 2]);
        assert_eq!(graph.neighbors(2), &[0, 1]);
        assert_eq!(graph.neighbors(3), &[0]);
    }

    #[test]
    fn test_byte_counters_overflow_into_shared() {
        // 1000 edges at the hub push its local counter past u8::MAX several times.
        let edges: EdgeList = (1..=1000u32).map(|v| (0, v)).collect();
        let graph = build_csr(&edges, 1001);
        assert_eq!(graph.row_len(0), 1000);
        assert_eq!(graph.edge_count, 2000);
        assert!((1..=1000).all(|v| graph.has_edge(v, 0)));
    }

    #[test]
    fn test_isolated_vertices() {
        let graph = build_csr(&EdgeList::from_pairs([(1, 3)]), 5);
        assert_eq!(graph.row_ptrs, vec![0, 0, 1, 1, 2, 2]);
    }

    #[test]
    fn test_empty() {
        let graph = build_csr(&EdgeList::default(), 0);
        assert_eq!(graph.vertex_count, 0);
        assert_eq!(graph.row_ptrs, vec![0]);
    }
}
