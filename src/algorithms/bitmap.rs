use crate::algorithms::view::{run_vertex_chunks, KernelStats, OrientedView, Tally};
use crate::primitives::{find_src, run_chunks, BitArray};
use crate::types::VertexId;

/// Global adjacency indices handed out per scheduling step by [`count_edge_bitmap`],
/// per vertex of the configured chunk size.
const EDGES_PER_CHUNK_VERTEX: usize = 16;

#[inline]
fn mark(bits: &mut BitArray, ids: &[VertexId]) {
    for &v in ids {
        bits.set(v as usize);
    }
}

#[inline]
fn unmark(bits: &mut BitArray, ids: &[VertexId]) {
    for &v in ids {
        bits.clear(v as usize);
    }
}

#[inline]
fn probe(bits: &BitArray, ids: &[VertexId]) -> Tally {
    let hits = ids.iter().filter(|&&w| bits.get(w as usize)).count();
    Tally {
        triangles: hits as u64,
        probes: ids.len() as u64,
    }
}

/// Forward counting with a dense bitmap of `n` bits per worker.
///
/// For every `u` the forward range is marked, each forward neighbor `v` probes its own forward
/// range against the marks, and the marks are cleared again before the next vertex.
pub fn count_bitmap(view: &OrientedView<'_>, chunk_size: usize) -> KernelStats {
    let n = view.vertex_count();
    run_vertex_chunks(view, chunk_size, || BitArray::new(n), |bits, u| {
        let forward_u = view.forward(u);
        if forward_u.is_empty() {
            return Tally::default();
        }
        mark(bits, forward_u);
        let tally = forward_u
            .iter()
            .map(|&v| probe(bits, view.forward(v)))
            .fold(Tally::default(), Tally::merge);
        unmark(bits, forward_u);
        tally
    })
}

struct EdgeScratch {
    bits: BitArray,
    marked: Option<VertexId>,
}

impl EdgeScratch {
    fn switch_to(&mut self, view: &OrientedView<'_>, u: VertexId) {
        if self.marked == Some(u) {
            return;
        }
        if let Some(previous) = self.marked.take() {
            unmark(&mut self.bits, view.forward(previous));
        }
        mark(&mut self.bits, view.forward(u));
        self.marked = Some(u);
    }

    fn release(&mut self, view: &OrientedView<'_>) {
        if let Some(previous) = self.marked.take() {
            unmark(&mut self.bits, view.forward(previous));
        }
    }
}

/// Edge-parallel forward counting.
///
/// The global adjacency array is split into fixed-size index chunks, so a hub row is spread
/// over many workers. The owning row of an index is located with [`find_src`], galloping from
/// the row of the previous index. Forward range marks are kept while consecutive edges share
/// their source.
pub fn count_edge_bitmap(view: &OrientedView<'_>, chunk_size: usize) -> KernelStats {
    let graph = view.graph();
    let n = view.vertex_count();
    let m = graph.edge_count;
    if m == 0 {
        return KernelStats::default();
    }
    let edge_chunk = chunk_size.max(1) * EDGES_PER_CHUNK_VERTEX;
    let init = || EdgeScratch {
        bits: BitArray::new(n),
        marked: None,
    };

    let tally = run_chunks(
        m.div_ceil(edge_chunk),
        init,
        |s, c| {
            let (beg, end) = (c * edge_chunk, ((c + 1) * edge_chunk).min(m));
            let mut tally = Tally::default();
            let mut u = find_src(&graph.row_ptrs, 0, beg);
            for idx in beg..end {
                if idx >= graph.row_ptrs[u + 1] {
                    u = find_src(&graph.row_ptrs, u, idx);
                }
                if idx >= view.forward_end(u as VertexId) {
                    continue;
                }
                s.switch_to(view, u as VertexId);
                tally = tally.merge(probe(&s.bits, view.forward(graph.adj[idx])));
            }
            s.release(view);
            tally
        },
        Tally::merge,
    );

    KernelStats {
        triangle_count: tally.triangles,
        probes: tally.probes,
        max_forward_degree: view.max_forward_degree(),
    }
}

#[cfg(test)]
mod test_bitmap {
    use super::*;
    use crate::graph_gen;
    use crate::preprocess::{build_csr, build_dodg, dedup_edges};

    #[test]
    fn test_complete_graph() {
        let dedup = dedup_edges(graph_gen::complete_graph(12));
        let mut graph = build_csr(&dedup.edges, dedup.vertex_count());
        graph.sort_rows();
        let view = OrientedView::new(&graph);
        assert_eq!(count_bitmap(&view, 3).triangle_count, 220);
        assert_eq!(count_edge_bitmap(&view, 1).triangle_count, 220);
    }

    #[test]
    fn test_wheel_on_dodg() {
        let dedup = dedup_edges(graph_gen::wheel_graph(9));
        let mut dodg = build_dodg(&dedup.edges, dedup.vertex_count());
        dodg.graph.sort_rows();
        let view = OrientedView::new(&dodg.graph);
        assert_eq!(count_bitmap(&view, 100).triangle_count, 8);
        assert_eq!(count_edge_bitmap(&view, 100).triangle_count, 8);
    }
}
