use crate::algorithms::view::{run_vertex_chunks, KernelStats, OrientedView, Tally};
use crate::primitives::RadixSet;

/// Forward counting with a per-worker radix hash set over the forward range of `u`.
///
/// Scratch size follows the forward degree rather than `n`, which suits graphs whose vertex
/// count dwarfs their forward degrees.
pub fn count_radix(view: &OrientedView<'_>, chunk_size: usize) -> KernelStats {
    run_vertex_chunks(view, chunk_size, RadixSet::new, |set, u| {
        let forward_u = view.forward(u);
        if forward_u.is_empty() {
            return Tally::default();
        }
        set.construct(forward_u);
        let mut tally = Tally::default();
        for &v in forward_u {
            let forward_v = view.forward(v);
            tally.probes += forward_v.len() as u64;
            tally.triangles += forward_v.iter().filter(|&&w| set.contains(w)).count() as u64;
        }
        tally
    })
}
