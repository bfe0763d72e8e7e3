use std::collections::BTreeMap;

use crate::types::VertexId;

/// A trait that defines read-only query operations over an adjacency structure.
///
/// Downstream consumers of a built graph go through this trait so they do not depend on
/// the concrete CSR layout.
pub trait GraphQuery {
    /// Retrieves the neighbors of a given vertex.
    ///
    /// # Returns
    ///
    /// The adjacency row of `vertex_id`, or an empty slice for an out-of-range id.
    fn read_neighbor(&self, vertex_id: VertexId) -> &[VertexId];

    /// Checks if a specific vertex exists in the graph.
    fn has_vertex(&self, vertex_id: VertexId) -> bool;

    /// Determines if an edge exists between two specified vertices.
    ///
    /// # Returns
    ///
    /// `true` if `dst_id` is stored in the adjacency row of `src_id`.
    fn has_edge(&self, src_id: VertexId, dst_id: VertexId) -> bool {
        self.has_vertex(src_id) && self.read_neighbor(src_id).contains(&dst_id)
    }

    /// Number of entries in the adjacency row of `vertex_id`.
    fn degree(&self, vertex_id: VertexId) -> usize {
        self.read_neighbor(vertex_id).len()
    }

    /// Retrieves a list of all vertices in the graph.
    fn vertex_list(&self) -> Vec<VertexId>;

    /// Generates a complete representation of the graph as a map.
    ///
    /// # Returns
    ///
    /// A `BTreeMap` from each vertex id to a copy of its adjacency row.
    fn all(&self) -> BTreeMap<VertexId, Vec<VertexId>> {
        self.vertex_list()
            .into_iter()
            .map(|vertex| (vertex, self.read_neighbor(vertex).to_vec()))
            .collect()
    }
}
