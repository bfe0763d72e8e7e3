use rayon::prelude::*;

use crate::types::VertexId;

/// An undirected edge stored as an ordered pair of vertex ids.
///
/// After canonicalization `src <= dst`. The derived ordering is lexicographic on
/// `(src, dst)`, which is the order deduplication sorts by.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    pub src: VertexId,
    pub dst: VertexId,
}

impl Edge {
    pub const fn new(src: VertexId, dst: VertexId) -> Self {
        Self { src, dst }
    }

    /// Returns the edge with its endpoints ordered so that `src <= dst`.
    #[inline]
    pub fn canonical(self) -> Self {
        if self.src > self.dst {
            Self { src: self.dst, dst: self.src }
        } else {
            self
        }
    }

    #[inline]
    pub fn is_self_loop(&self) -> bool {
        self.src == self.dst
    }

    #[inline]
    pub fn max_endpoint(&self) -> VertexId {
        self.src.max(self.dst)
    }
}

impl From<(VertexId, VertexId)> for Edge {
    fn from((src, dst): (VertexId, VertexId)) -> Self {
        Self { src, dst }
    }
}

/// An owned, contiguous buffer of edges.
///
/// Each pipeline stage takes an `EdgeList` by value and hands back a new one, so the
/// buffer a stage consumed is freed as soon as the stage returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeList {
    edges: Vec<Edge>,
}

impl EdgeList {
    pub fn new(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (VertexId, VertexId)>,
    {
        Self {
            edges: pairs.into_iter().map(Edge::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn as_slice(&self) -> &[Edge] {
        &self.edges
    }

    pub fn as_mut_slice(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    pub fn into_inner(self) -> Vec<Edge> {
        self.edges
    }

    /// Largest endpoint over all edges, `None` for an empty list.
    pub fn max_vertex_id(&self) -> Option<VertexId> {
        self.edges.par_iter().map(Edge::max_endpoint).max()
    }

    /// Vertex count implied by the largest id (`max + 1`), zero for an empty list.
    pub fn vertex_count(&self) -> usize {
        self.max_vertex_id().map_or(0, |max_id| max_id as usize + 1)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Edge> {
        self.edges.iter()
    }
}

impl From<Vec<Edge>> for EdgeList {
    fn from(edges: Vec<Edge>) -> Self {
        Self { edges }
    }
}

impl FromIterator<(VertexId, VertexId)> for EdgeList {
    fn from_iter<T: IntoIterator<Item = (VertexId, VertexId)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}

#[cfg(test)]
mod test_edge {
    use super::*;

    #[test]
    fn test_canonical_orders_endpoints() {
        assert_eq!(Edge::new(5, 2).canonical(), Edge::new(2, 5));
        assert_eq!(Edge::new(2, 5).canonical(), Edge::new(2, 5));
        assert_eq!(Edge::new(3, 3).canonical(), Edge::new(3, 3));
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let mut edges = vec![Edge::new(1, 0), Edge::new(0, 2), Edge::new(0, 1)];
        edges.sort();
        assert_eq!(edges, vec![Edge::new(0, 1), Edge::new(0, 2), Edge::new(1, 0)]);
    }

    #[test]
    fn test_vertex_count() {
        let list = EdgeList::from_pairs([(0, 1), (7, 2)]);
        assert_eq!(list.max_vertex_id(), Some(7));
        assert_eq!(list.vertex_count(), 8);
        assert_eq!(EdgeList::default().vertex_count(), 0);
    }
}
