use std::sync::atomic::{AtomicU32, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::types::graph_query::GraphQuery;

pub mod edge;
pub mod graph_query;

pub use edge::{Edge, EdgeList};

/// Vertex identifier. Ids are dense in `[0, n)`.
pub type VertexId = u32;

/// Largest usable vertex id. `n = max id + 1` must itself be a `VertexId`, so `u32::MAX` is
/// reserved.
pub const MAX_VERTEX_ID: VertexId = VertexId::MAX - 1;

/// How the adjacency of a [`Graph`] was materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Both directions of every undirected edge are stored, `m == 2|E|`.
    #[serde(rename = "symmetric")]
    Symmetric,
    /// Every edge is stored once, at its lower-ranked endpoint, `m == |E|`.
    #[serde(rename = "dodg")]
    DegreeOriented,
}

/// A CSR (Compressed Sparse Row) representation of a static graph.
///
/// # Fields
/// * `vertex_count` - Number of vertices `n`; ids are `0..n`.
/// * `edge_count` - Number of stored adjacency entries `m`. This is `2|E|` for a symmetric graph
///   and `|E|` for a degree-oriented one.
/// * `row_ptrs` - `n + 1` non-decreasing offsets, `row_ptrs[n] == m`.
/// * `adj` - Flat neighbor array; the neighbors of `u` are `adj[row_ptrs[u]..row_ptrs[u + 1]]`.
/// * `orientation` - Which of the two layouts this is.
///
/// Rows are sorted ascending once the graph has been reordered or [`Graph::sort_rows`] ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    pub vertex_count: usize,
    pub edge_count: usize,
    pub row_ptrs: Vec<usize>,
    pub adj: Vec<VertexId>,
    pub orientation: Orientation,
}

impl Graph {
    /// Assembles a graph from already-built CSR arrays.
    ///
    /// # Panics
    /// If the offsets are not a valid CSR frame over `adj`.
    pub fn from_parts(row_ptrs: Vec<usize>, adj: Vec<VertexId>, orientation: Orientation) -> Self {
        assert!(!row_ptrs.is_empty(), "row_ptrs must hold n + 1 offsets");
        let graph = Self {
            vertex_count: row_ptrs.len() - 1,
            edge_count: adj.len(),
            row_ptrs,
            adj,
            orientation,
        };
        graph.verify_offsets();
        graph
    }

    /// A graph with `vertex_count` isolated vertices.
    pub fn empty(vertex_count: usize, orientation: Orientation) -> Self {
        Self {
            vertex_count,
            edge_count: 0,
            row_ptrs: vec![0; vertex_count + 1],
            adj: Vec::new(),
            orientation,
        }
    }

    /// Adjacency row of `u`.
    #[inline]
    pub fn neighbors(&self, u: VertexId) -> &[VertexId] {
        let u = u as usize;
        &self.adj[self.row_ptrs[u]..self.row_ptrs[u + 1]]
    }

    /// Row length of `u`.
    #[inline]
    pub fn row_len(&self, u: VertexId) -> usize {
        let u = u as usize;
        self.row_ptrs[u + 1] - self.row_ptrs[u]
    }

    /// Row lengths of every vertex, computed in parallel.
    pub fn degrees(&self) -> Vec<u32> {
        self.row_ptrs
            .par_windows(2)
            .map(|w| (w[1] - w[0]) as u32)
            .collect()
    }

    /// Longest row, zero for a graph without vertices.
    pub fn max_degree(&self) -> usize {
        self.row_ptrs
            .par_windows(2)
            .map(|w| w[1] - w[0])
            .max()
            .unwrap_or(0)
    }

    /// Number of undirected edges represented.
    pub fn undirected_edge_count(&self) -> usize {
        match self.orientation {
            Orientation::Symmetric => self.edge_count / 2,
            Orientation::DegreeOriented => self.edge_count,
        }
    }

    /// Sorts every adjacency row ascending, rows processed in parallel.
    pub fn sort_rows(&mut self) {
        split_rows_mut(&mut self.adj, &self.row_ptrs)
            .into_par_iter()
            .with_min_len(64)
            .for_each(|row| row.sort_unstable());
    }

    /// Whether every adjacency row is strictly ascending.
    pub fn rows_sorted(&self) -> bool {
        (0..self.vertex_count).into_par_iter().all(|u| {
            self.neighbors(u as VertexId).windows(2).all(|w| w[0] < w[1])
        })
    }

    /// Checks the CSR frame: `n + 1` offsets starting at zero, non-decreasing, ending at `m`.
    ///
    /// # Panics
    /// On any violation; a malformed frame means an earlier stage is broken.
    pub fn verify_offsets(&self) {
        assert_eq!(self.row_ptrs.len(), self.vertex_count + 1, "row_ptrs must hold n + 1 offsets");
        assert_eq!(self.row_ptrs[0], 0, "row_ptrs[0] must be zero");
        assert!(
            self.row_ptrs.par_windows(2).all(|w| w[0] <= w[1]),
            "row_ptrs must be non-decreasing"
        );
        assert_eq!(self.row_ptrs[self.vertex_count], self.edge_count, "row_ptrs[n] must equal m");
        assert_eq!(self.adj.len(), self.edge_count, "adj must hold m entries");
    }
}

impl GraphQuery for Graph {
    fn read_neighbor(&self, vertex_id: VertexId) -> &[VertexId] {
        if self.has_vertex(vertex_id) {
            self.neighbors(vertex_id)
        } else {
            &[]
        }
    }

    fn has_vertex(&self, vertex_id: VertexId) -> bool {
        (vertex_id as usize) < self.vertex_count
    }

    fn vertex_list(&self) -> Vec<VertexId> {
        (0..self.vertex_count as VertexId).collect()
    }
}

/// Splits a flat adjacency buffer into one disjoint mutable slice per row.
pub(crate) fn split_rows_mut<'a>(mut adj: &'a mut [VertexId], row_ptrs: &[usize]) -> Vec<&'a mut [VertexId]> {
    let mut rows = Vec::with_capacity(row_ptrs.len().saturating_sub(1));
    for w in row_ptrs.windows(2) {
        let (row, rest) = std::mem::take(&mut adj).split_at_mut(w[1] - w[0]);
        rows.push(row);
        adj = rest;
    }
    rows
}

/// A bijection between old and new vertex ids over `[0, n)`.
///
/// # Fields
/// * `new_of_old` - `new_of_old[old] == new`.
/// * `old_of_new` - `old_of_new[new] == old`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexPermutation {
    new_of_old: Vec<VertexId>,
    old_of_new: Vec<VertexId>,
}

impl VertexPermutation {
    /// The identity permutation on `n` vertices.
    pub fn identity(n: usize) -> Self {
        let ids: Vec<VertexId> = (0..n as VertexId).collect();
        Self {
            new_of_old: ids.clone(),
            old_of_new: ids,
        }
    }

    /// Builds the inverse mapping from an ordering of old ids and checks bijectivity.
    ///
    /// # Panics
    /// If `old_of_new` holds an out-of-range id or repeats one.
    pub fn from_old_of_new(old_of_new: Vec<VertexId>) -> Self {
        let n = old_of_new.len();
        let new_of_old: Vec<AtomicU32> = (0..n).map(|_| AtomicU32::new(VertexId::MAX)).collect();
        old_of_new.par_iter().enumerate().for_each(|(new_id, &old_id)| {
            assert!((old_id as usize) < n, "permutation maps to out-of-range vertex {old_id}");
            new_of_old[old_id as usize].store(new_id as VertexId, Ordering::Relaxed);
        });
        let new_of_old: Vec<VertexId> = new_of_old.into_iter().map(AtomicU32::into_inner).collect();
        let permutation = Self { new_of_old, old_of_new };
        permutation.verify();
        permutation
    }

    /// Checks that both mappings are inverse to each other.
    ///
    /// # Panics
    /// If some new id is not hit exactly once.
    pub fn verify(&self) {
        assert_eq!(self.new_of_old.len(), self.old_of_new.len(), "permutation halves differ in length");
        let bijective = self
            .old_of_new
            .par_iter()
            .enumerate()
            .all(|(new_id, &old_id)| self.new_of_old[old_id as usize] as usize == new_id);
        assert!(bijective, "vertex permutation is not a bijection");
    }

    pub fn len(&self) -> usize {
        self.old_of_new.len()
    }

    pub fn is_empty(&self) -> bool {
        self.old_of_new.is_empty()
    }

    #[inline]
    pub fn new_id(&self, old_id: VertexId) -> VertexId {
        self.new_of_old[old_id as usize]
    }

    #[inline]
    pub fn old_id(&self, new_id: VertexId) -> VertexId {
        self.old_of_new[new_id as usize]
    }

    pub fn new_of_old(&self) -> &[VertexId] {
        &self.new_of_old
    }

    pub fn old_of_new(&self) -> &[VertexId] {
        &self.old_of_new
    }
}
