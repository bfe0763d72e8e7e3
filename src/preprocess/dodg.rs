use crate::preprocess::csr::{degrees_of, edge_histogram, offsets_from_lengths, scatter_rows};
use crate::types::{EdgeList, Graph, Orientation, VertexId};

/// Total order on vertices by `(degree, id)`.
///
/// `rank_lt(du, dv, u, v)` is true iff `u` ranks below `v`. For `u != v` exactly one of
/// `rank_lt(du, dv, u, v)` and `rank_lt(dv, du, v, u)` holds.
#[inline]
pub fn rank_lt(du: u32, dv: u32, u: VertexId, v: VertexId) -> bool {
    du < dv || (du == dv && u < v)
}

/// Degree-oriented DAG together with the undirected degrees it was oriented by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dodg {
    pub graph: Graph,
    pub degrees: Vec<u32>,
}

/// Builds the degree-oriented DAG of a deduplicated edge list.
///
/// Every edge `{u, v}` becomes the single arc from its lower-ranked endpoint to the higher-ranked
/// one, so the graph stores `|E|` entries and every out-row only holds higher-ranked vertices.
///
/// # Panics
/// If an endpoint is `>= vertex_count`, or if `row_ptrs[n] != |E|`.
pub fn build_dodg(edges: &EdgeList, vertex_count: usize) -> Dodg {
    let slice = edges.as_slice();

    // Step 1. Undirected degrees decide the orientation.
    let degrees = degrees_of(edges, vertex_count);
    let source_of = |src: VertexId, dst: VertexId| -> (VertexId, VertexId) {
        if rank_lt(degrees[src as usize], degrees[dst as usize], src, dst) {
            (src, dst)
        } else {
            (dst, src)
        }
    };

    // Step 2. Out-degrees.
    let out_degrees = edge_histogram(slice, vertex_count, |edge, counter| {
        counter.bump(source_of(edge.src, edge.dst).0);
    });
    let row_ptrs = offsets_from_lengths(&out_degrees);
    assert_eq!(
        row_ptrs[vertex_count],
        slice.len(),
        "DODG must hold exactly one arc per undirected edge"
    );

    // Step 3. One arc per edge.
    let adj = scatter_rows(slice, &row_ptrs, |edge, sink| {
        let (from, to) = source_of(edge.src, edge.dst);
        sink(from, to);
    });

    Dodg {
        graph: Graph::from_parts(row_ptrs, adj, Orientation::DegreeOriented),
        degrees,
    }
}

#[cfg(test)]
mod test_dodg {
    use super::*;
    use crate::preprocess::dedup::dedup_edges;

    #[test]
    fn test_rank_lt_is_total_and_antisymmetric() {
        for (du, dv, u, v) in [(1, 2, 5, 3), (2, 2, 3, 5), (2, 2, 5, 3), (7, 1, 0, 1)] {
            assert_ne!(rank_lt(du, dv, u, v), rank_lt(dv, du, v, u));
        }
        assert!(!rank_lt(3, 3, 4, 4));
    }

    #[test]
    fn test_triangle_with_tail() {
        let dedup = dedup_edges(EdgeList::from_pairs([(0, 1), (1, 2), (2, 0), (0, 3)]));
        let mut dodg = build_dodg(&dedup.edges, dedup.vertex_count());
        dodg.graph.sort_rows();
        assert_eq!(dodg.degrees, vec![3, 2, 2, 1]);
        // Ranks: 3 < 1 < 2 < 0.
        assert_eq!(dodg.graph.neighbors(3), &[0]);
        assert_eq!(dodg.graph.neighbors(1), &[0, 2]);
        assert_eq!(dodg.graph.neighbors(2), &[0]);
        assert!(dodg.graph.neighbors(0).is_empty());
        assert_eq!(dodg.graph.edge_count, 4);
    }

    #[test]
    fn test_every_edge_has_one_arc() {
        let pairs: Vec<(u32, u32)> = (0..40u32)
            .flat_map(|u| (u + 1..40).filter(move |v| (u * v) % 3 != 1).map(move |v| (u, v)))
            .collect();
        let dedup = dedup_edges(EdgeList::from_pairs(pairs));
        let mut dodg = build_dodg(&dedup.edges, dedup.vertex_count());
        dodg.graph.sort_rows();
        let arcs: usize = dodg.graph.degrees().iter().map(|&d| d as usize).sum();
        assert_eq!(arcs, dedup.edges.len());
        for edge in dedup.edges.iter() {
            let forward = dodg.graph.neighbors(edge.src).binary_search(&edge.dst).is_ok();
            let backward = dodg.graph.neighbors(edge.dst).binary_search(&edge.src).is_ok();
            assert!(forward ^ backward);
        }
    }
}
