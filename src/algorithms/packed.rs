use crate::algorithms::view::{run_vertex_chunks, KernelStats, OrientedView, PackedRows, PackedWord, Tally};
use crate::primitives::{count_common, BitArray};

/// Dense per-worker words covering the packed id range.
struct PackedScratch {
    words: Vec<u64>,
    high: BitArray,
}

#[inline]
fn load(words: &mut [u64], row: &[PackedWord]) {
    for entry in row {
        words[entry.word as usize] = entry.mask;
    }
}

#[inline]
fn reset(words: &mut [u64], row: &[PackedWord]) {
    for entry in row {
        words[entry.word as usize] = 0;
    }
}

#[inline]
fn and_popcount(words: &[u64], row: &[PackedWord]) -> Tally {
    let triangles: u64 = row
        .iter()
        .map(|entry| (words[entry.word as usize] & entry.mask).count_ones() as u64)
        .sum();
    Tally {
        triangles,
        probes: row.len() as u64,
    }
}

/// Word-packed bitmap kernel.
///
/// Forward neighbors below the packing threshold are loaded into the dense words as the
/// precomputed `(word, mask)` pairs of `u`; a neighbor `v` then intersects its own pairs with
/// one AND and one popcount per word. The unpacked remainder goes through a plain bitmap.
/// Both structures are reset from the same lists after every vertex.
pub fn count_packed_bitmap(view: &OrientedView<'_>, packed: &PackedRows, chunk_size: usize) -> KernelStats {
    let n = view.vertex_count();
    let init = || PackedScratch {
        words: vec![0u64; packed.word_count()],
        high: BitArray::new(n),
    };
    run_vertex_chunks(view, chunk_size, init, |scratch, u| {
        let forward_u = view.forward(u);
        if forward_u.is_empty() {
            return Tally::default();
        }
        let high_u = &forward_u[packed.split(u)..];
        load(&mut scratch.words, packed.row(u));
        for &v in high_u {
            scratch.high.set(v as usize);
        }

        let mut tally = Tally::default();
        for &v in forward_u {
            tally = tally.merge(and_popcount(&scratch.words, packed.row(v)));
            let high_v = &view.forward(v)[packed.split(v)..];
            let hits = high_v.iter().filter(|&&w| scratch.high.get(w as usize)).count();
            tally = tally.merge(Tally {
                triangles: hits as u64,
                probes: high_v.len() as u64,
            });
        }

        reset(&mut scratch.words, packed.row(u));
        for &v in high_u {
            scratch.high.clear(v as usize);
        }
        tally
    })
}

/// Word-packed low range combined with a SIMD merge over the unpacked high range.
///
/// Needs no bitmap of size `n`: only the dense words of the packed range are kept per worker.
pub fn count_packed_merge(view: &OrientedView<'_>, packed: &PackedRows, chunk_size: usize) -> KernelStats {
    run_vertex_chunks(view, chunk_size, || vec![0u64; packed.word_count()], |words, u| {
        let forward_u = view.forward(u);
        if forward_u.is_empty() {
            return Tally::default();
        }
        let high_u = &forward_u[packed.split(u)..];
        load(words, packed.row(u));

        let mut tally = Tally::default();
        for &v in forward_u {
            tally = tally.merge(and_popcount(words, packed.row(v)));
            let high_v = &view.forward(v)[packed.split(v)..];
            if !high_u.is_empty() && !high_v.is_empty() {
                tally = tally.merge(Tally {
                    triangles: count_common(high_u, high_v) as u64,
                    probes: (high_u.len() + high_v.len()) as u64,
                });
            }
        }

        reset(words, packed.row(u));
        tally
    })
}
