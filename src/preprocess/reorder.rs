use rayon::prelude::*;

use crate::preprocess::csr::offsets_from_lengths;
use crate::primitives::bucket_sort_buffered;
use crate::primitives::worker::split_by_lens;
use crate::types::{split_rows_mut, Graph, VertexId, VertexPermutation};

/// Relabels vertices by non-increasing degree.
///
/// Bucket id is `max_degree - degree`, so bucket 0 holds the highest-degree vertices and
/// becomes the lowest new ids. Vertices inside one bucket are ordered by old id, which makes
/// the permutation independent of scheduling.
///
/// # Arguments
/// * `degrees` - Degree of every old id.
/// * `budget_bytes` - Per-worker budget for the bucket write-ahead buffers.
pub fn degree_descending_order(degrees: &[u32], budget_bytes: usize) -> VertexPermutation {
    let n = degrees.len();
    let max_degree = degrees.par_iter().copied().max().unwrap_or(0);
    let num_buckets = max_degree as usize + 1;
    let ids: Vec<VertexId> = (0..n as VertexId).collect();

    let mut sorted = bucket_sort_buffered(&ids, num_buckets, budget_bytes, |i| {
        (max_degree - degrees[i]) as usize
    });
    let lens: Vec<usize> = sorted.bucket_ptrs.windows(2).map(|w| w[1] - w[0]).collect();
    split_by_lens(&mut sorted.output, lens)
        .into_par_iter()
        .for_each(|bucket| bucket.sort_unstable());

    VertexPermutation::from_old_of_new(sorted.output)
}

/// Rebuilds `graph` under new ids: row `new` is the translated, ascending row of its old id.
pub fn apply_permutation(graph: &Graph, permutation: &VertexPermutation) -> Graph {
    assert_eq!(permutation.len(), graph.vertex_count, "permutation must cover every vertex");

    // Step 1. Row lengths in new-id order.
    let lengths: Vec<u32> = (0..graph.vertex_count)
        .into_par_iter()
        .map(|new_id| graph.row_len(permutation.old_id(new_id as VertexId)) as u32)
        .collect();
    let row_ptrs = offsets_from_lengths(&lengths);

    // Step 2. Copy, translate and sort every row.
    let mut adj = vec![0 as VertexId; graph.edge_count];
    split_rows_mut(&mut adj, &row_ptrs)
        .into_par_iter()
        .enumerate()
        .with_min_len(64)
        .for_each(|(new_id, row)| {
            let old_row = graph.neighbors(permutation.old_id(new_id as VertexId));
            for (slot, &old_neighbor) in row.iter_mut().zip(old_row) {
                *slot = permutation.new_id(old_neighbor);
            }
            row.sort_unstable();
        });

    Graph::from_parts(row_ptrs, adj, graph.orientation)
}

/// Reorders `graph` by `degrees` and returns the relabeled graph with its permutation.
pub fn reorder_graph(graph: &Graph, degrees: &[u32], budget_bytes: usize) -> (Graph, VertexPermutation) {
    let permutation = degree_descending_order(degrees, budget_bytes);
    let reordered = apply_permutation(graph, &permutation);
    (reordered, permutation)
}

#[cfg(test)]
mod test_reorder {
    use proptest::prelude::*;

    use super::*;
    use crate::config::DEFAULT_LOCAL_BUDGET;
    use crate::preprocess::csr::build_csr;
    use crate::preprocess::dedup::dedup_edges;
    use crate::types::EdgeList;

    #[test]
    fn test_order_is_degree_descending_with_id_ties() {
        let permutation = degree_descending_order(&[1, 3, 1, 0, 3], DEFAULT_LOCAL_BUDGET);
        assert_eq!(permutation.old_of_new(), &[1, 4, 0, 2, 3]);
        assert_eq!(permutation.new_id(3), 4);
    }

    #[test]
    fn test_apply_permutation_relabels_rows() {
        let dedup = dedup_edges(EdgeList::from_pairs([(0, 1), (1, 2), (2, 0), (0, 3)]));
        let graph = build_csr(&dedup.edges, dedup.vertex_count());
        let (reordered, permutation) = reorder_graph(&graph, &graph.degrees(), DEFAULT_LOCAL_BUDGET);
        assert_eq!(permutation.old_of_new(), &[0, 1, 2, 3]);
        assert!(reordered.rows_sorted());
        assert_eq!(reordered.neighbors(0), &[1, 2, 3]);

        // Old vertex 3 becomes new vertex 0 under a reversing permutation.
        let reversed = VertexPermutation::from_old_of_new(vec![3, 2, 1, 0]);
        let relabeled = apply_permutation(&graph, &reversed);
        assert_eq!(relabeled.neighbors(0), &[3]);
        assert_eq!(relabeled.neighbors(3), &[0, 1, 2]);
    }

    #[test]
    fn test_empty_graph() {
        let permutation = degree_descending_order(&[], DEFAULT_LOCAL_BUDGET);
        assert!(permutation.is_empty());
    }

    proptest! {
        #[test]
        fn prop_reordered_degrees_are_non_increasing(pairs in prop::collection::vec((0u32..80, 0u32..80), 1..600)) {
            let dedup = dedup_edges(EdgeList::from_pairs(pairs));
            let graph = build_csr(&dedup.edges, dedup.vertex_count());
            // A small budget exercises the flush path.
            let (reordered, permutation) = reorder_graph(&graph, &graph.degrees(), 256);
            permutation.verify();
            let degrees = reordered.degrees();
            prop_assert!(degrees.windows(2).all(|w| w[0] >= w[1]));
            prop_assert_eq!(reordered.edge_count, graph.edge_count);
            for old_id in 0..graph.vertex_count as u32 {
                let mut expected: Vec<u32> = graph.neighbors(old_id).iter().map(|&v| permutation.new_id(v)).collect();
                expected.sort_unstable();
                prop_assert_eq!(reordered.neighbors(permutation.new_id(old_id)), expected.as_slice());
            }
        }
    }
}
