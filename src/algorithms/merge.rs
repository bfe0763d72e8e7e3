use crate::algorithms::view::{run_vertex_chunks, KernelStats, OrientedView, Tally};
use crate::primitives::count_common;

/// Forward counting by direct intersection of sorted forward ranges.
///
/// No scratch at all: every pair `(u, v)` runs [`count_common`], which picks galloping for
/// skewed lengths and the widest available block merge otherwise.
pub fn count_merge(view: &OrientedView<'_>, chunk_size: usize) -> KernelStats {
    run_vertex_chunks(view, chunk_size, || (), |_, u| {
        let forward_u = view.forward(u);
        let mut tally = Tally::default();
        for &v in forward_u {
            let forward_v = view.forward(v);
            if forward_v.is_empty() {
                continue;
            }
            tally.triangles += count_common(forward_u, forward_v) as u64;
            tally.probes += (forward_u.len() + forward_v.len()) as u64;
        }
        tally
    })
}
