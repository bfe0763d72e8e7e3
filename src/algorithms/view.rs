use rayon::prelude::*;

use crate::primitives::worker::split_by_lens;
use crate::primitives::run_chunks;
use crate::types::{Graph, Orientation, VertexId};

/// Forward adjacency of a graph with sorted rows.
///
/// Every kernel counts a triangle at exactly one vertex by intersecting forward ranges:
/// * on a DODG the forward range of `u` is its whole out-row;
/// * on a symmetric CSR it is the prefix of the row holding neighbors with a smaller id.
///   After degree-descending relabeling these are exactly the higher-degree neighbors.
pub struct OrientedView<'a> {
    graph: &'a Graph,
    forward_end: Vec<usize>,
}

impl<'a> OrientedView<'a> {
    /// # Panics
    /// If some row of `graph` is not strictly ascending.
    pub fn new(graph: &'a Graph) -> Self {
        assert!(graph.rows_sorted(), "adjacency rows must be sorted before counting");
        let forward_end = match graph.orientation {
            Orientation::DegreeOriented => graph.row_ptrs[1..].to_vec(),
            Orientation::Symmetric => (0..graph.vertex_count)
                .into_par_iter()
                .map(|u| {
                    let row = graph.neighbors(u as VertexId);
                    graph.row_ptrs[u] + row.partition_point(|&v| (v as usize) < u)
                })
                .collect(),
        };
        Self { graph, forward_end }
    }

    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.vertex_count
    }

    #[inline]
    pub fn forward(&self, u: VertexId) -> &'a [VertexId] {
        let u = u as usize;
        &self.graph.adj[self.graph.row_ptrs[u]..self.forward_end[u]]
    }

    /// One past the last forward entry of `u` in the global adjacency array.
    #[inline]
    pub fn forward_end(&self, u: VertexId) -> usize {
        self.forward_end[u as usize]
    }

    pub fn forward_edge_count(&self) -> usize {
        (0..self.vertex_count())
            .into_par_iter()
            .map(|u| self.forward(u as VertexId).len())
            .sum()
    }

    pub fn max_forward_degree(&self) -> usize {
        (0..self.vertex_count())
            .into_par_iter()
            .map(|u| self.forward(u as VertexId).len())
            .max()
            .unwrap_or(0)
    }
}

/// One non-zero word of a packed neighbor set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackedWord {
    pub word: u32,
    pub mask: u64,
}

/// Word-packed forward ranges restricted to ids below `packed_range`.
///
/// Since rows are sorted, the packed ids of a row form its prefix; `split(u)` is that prefix
/// length and the entries after it are the unpacked remainder.
pub struct PackedRows {
    packed_range: usize,
    offsets: Vec<usize>,
    split: Vec<usize>,
    entries: Vec<PackedWord>,
}

impl PackedRows {
    /// Precomputes the packed words of every forward range.
    ///
    /// # Arguments
    /// * `packed_range` - Exclusive bound of packed ids, a multiple of 64.
    pub fn build(view: &OrientedView<'_>, packed_range: usize) -> Self {
        assert_eq!(packed_range % 64, 0, "packed range must cover whole words");
        let n = view.vertex_count();

        // Step 1. Packed prefix length and distinct word count per vertex.
        let (split, counts): (Vec<usize>, Vec<usize>) = (0..n)
            .into_par_iter()
            .map(|u| {
                let forward = view.forward(u as VertexId);
                let split = forward.partition_point(|&v| (v as usize) < packed_range);
                let words = forward[..split]
                    .chunk_by(|a, b| a >> 6 == b >> 6)
                    .count();
                (split, words)
            })
            .unzip();

        // Step 2. Offsets.
        let mut offsets = Vec::with_capacity(n + 1);
        offsets.push(0usize);
        for &c in &counts {
            offsets.push(offsets[offsets.len() - 1] + c);
        }

        // Step 3. Fill.
        let mut entries = vec![PackedWord::default(); offsets[n]];
        split_by_lens(&mut entries, counts)
            .into_par_iter()
            .enumerate()
            .with_min_len(64)
            .for_each(|(u, out)| {
                let forward = view.forward(u as VertexId);
                for (slot, group) in out.iter_mut().zip(forward[..split[u]].chunk_by(|a, b| a >> 6 == b >> 6)) {
                    slot.word = group[0] >> 6;
                    slot.mask = group.iter().fold(0u64, |m, &v| m | (1u64 << (v & 63)));
                }
            });

        Self {
            packed_range,
            offsets,
            split,
            entries,
        }
    }

    pub fn packed_range(&self) -> usize {
        self.packed_range
    }

    /// Number of 64-bit words a dense scratch needs to cover the packed range.
    pub fn word_count(&self) -> usize {
        self.packed_range / 64
    }

    #[inline]
    pub fn row(&self, u: VertexId) -> &[PackedWord] {
        let u = u as usize;
        &self.entries[self.offsets[u]..self.offsets[u + 1]]
    }

    #[inline]
    pub fn split(&self, u: VertexId) -> usize {
        self.split[u as usize]
    }
}

/// Workload figures of one kernel run.
///
/// # Fields
/// * `triangle_count` - Number of triangles.
/// * `probes` - Membership tests, word ANDs or merged elements the kernel performed.
/// * `max_forward_degree` - Longest forward range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KernelStats {
    pub triangle_count: u64,
    pub probes: u64,
    pub max_forward_degree: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Tally {
    pub triangles: u64,
    pub probes: u64,
}

impl Tally {
    #[inline]
    pub(crate) fn merge(self, other: Tally) -> Tally {
        Tally {
            triangles: self.triangles + other.triangles,
            probes: self.probes + other.probes,
        }
    }
}

/// Runs `body` for every vertex, `chunk_size` vertices per scheduling step.
///
/// Every worker builds one scratch context with `init` and reuses it for every vertex it
/// processes.
pub(crate) fn run_vertex_chunks<S, I, F>(view: &OrientedView<'_>, chunk_size: usize, init: I, body: F) -> KernelStats
where
    I: Fn() -> S + Sync,
    F: Fn(&mut S, VertexId) -> Tally + Sync,
{
    let n = view.vertex_count();
    let chunk_size = chunk_size.max(1);
    let tally = run_chunks(
        n.div_ceil(chunk_size),
        init,
        |s, c| {
            (c * chunk_size..((c + 1) * chunk_size).min(n))
                .map(|u| body(s, u as VertexId))
                .fold(Tally::default(), Tally::merge)
        },
        Tally::merge,
    );
    KernelStats {
        triangle_count: tally.triangles,
        probes: tally.probes,
        max_forward_degree: view.max_forward_degree(),
    }
}
