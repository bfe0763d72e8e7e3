use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;
use rayon::prelude::*;

use crate::primitives::worker::{split_by_lens, worker_ranges, SharedSlice};

/// Computes `output[i] = f(0) + ... + f(i)` for every `i < output.len()`.
///
/// Two passes over per-worker contiguous ranges:
/// 1. every worker sums its range into its own cache-line padded histogram slot;
/// 2. the slots are folded into exclusive offsets and every worker rescans its range,
///    writing running sums shifted by its offset.
///
/// The join between the passes is the barrier. The result does not depend on the number of
/// workers.
pub fn inclusive_prefix_sum_into<F>(output: &mut [usize], f: F)
where
    F: Fn(usize) -> usize + Sync,
{
    let size = output.len();
    if size == 0 {
        return;
    }
    let ranges = worker_ranges(size, rayon::current_num_threads());
    let histogram: Vec<CachePadded<AtomicUsize>> =
        (0..ranges.len()).map(|_| CachePadded::new(AtomicUsize::new(0))).collect();

    // Step 1. Local sums.
    ranges.par_iter().enumerate().for_each(|(w, range)| {
        let local: usize = range.clone().map(&f).sum();
        histogram[w].store(local, Ordering::Relaxed);
    });

    // Step 2. Exclusive offsets, folded by one thread.
    let mut offsets = Vec::with_capacity(ranges.len());
    let mut acc = 0usize;
    for slot in &histogram {
        offsets.push(acc);
        acc += slot.load(Ordering::Relaxed);
    }

    // Step 3. Rescan with offsets.
    split_by_lens(output, ranges.iter().map(|r| r.len()))
        .into_par_iter()
        .zip(ranges.par_iter())
        .zip(offsets.par_iter())
        .for_each(|((piece, range), &offset)| {
            let mut running = offset;
            for (slot, i) in piece.iter_mut().zip(range.clone()) {
                running += f(i);
                *slot = running;
            }
        });
}

/// Allocating form of [`inclusive_prefix_sum_into`].
pub fn inclusive_prefix_sum<F>(size: usize, f: F) -> Vec<usize>
where
    F: Fn(usize) -> usize + Sync,
{
    let mut output = vec![0usize; size];
    inclusive_prefix_sum_into(&mut output, f);
    output
}

/// Inclusive count of indices `j <= i` whose flag is set.
pub fn flag_prefix_sum<F>(size: usize, flag: F) -> Vec<usize>
where
    F: Fn(usize) -> bool + Sync,
{
    inclusive_prefix_sum(size, |i| flag(i) as usize)
}

/// Copies every `input[i]` with `!pred(i)` into a new buffer, keeping relative order.
///
/// The destination of a kept element is its flag prefix sum minus one, so the scatter needs
/// no synchronization beyond the join.
pub fn select_not_f<T, F>(input: &[T], pred: F) -> Vec<T>
where
    T: Copy + Default + Send + Sync,
    F: Fn(usize) -> bool + Sync,
{
    let keep = flag_prefix_sum(input.len(), |i| !pred(i));
    let kept = keep.last().copied().unwrap_or(0);
    let mut output = vec![T::default(); kept];
    let view = SharedSlice::new(&mut output);
    input.par_iter().enumerate().with_min_len(4096).for_each(|(i, item)| {
        let before = if i == 0 { 0 } else { keep[i - 1] };
        if keep[i] != before {
            // SAFETY: keep[i] - 1 is unique among kept indices.
            unsafe { view.write(keep[i] - 1, *item) };
        }
    });
    output
}

#[cfg(test)]
mod test_prefix_sum {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_prefix_sum_small() {
        assert_eq!(inclusive_prefix_sum(5, |i| i + 1), vec![1, 3, 6, 10, 15]);
        assert!(inclusive_prefix_sum(0, |i| i).is_empty());
    }

    #[test]
    fn test_prefix_sum_independent_of_workers() {
        let values: Vec<usize> = (0..10_007).map(|i| (i * 7919) % 13).collect();
        let expected: Vec<usize> = values
            .iter()
            .scan(0, |acc, &v| {
                *acc += v;
                Some(*acc)
            })
            .collect();
        for threads in [1, 2, 3, 8] {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build().unwrap();
            let got = pool.install(|| inclusive_prefix_sum(values.len(), |i| values[i]));
            assert_eq!(got, expected, "threads = {threads}");
        }
    }

    #[test]
    fn test_flag_prefix_sum() {
        assert_eq!(flag_prefix_sum(6, |i| i % 2 == 0), vec![1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn test_select_not_f_keeps_order() {
        let input: Vec<u32> = (0..20).collect();
        assert_eq!(select_not_f(&input, |i| input[i] % 3 != 0), vec![0, 3, 6, 9, 12, 15, 18]);
        assert!(select_not_f(&input, |_| true).is_empty());
    }

    proptest! {
        #[test]
        fn prop_select_not_f_matches_filter(input in prop::collection::vec(0u32..50, 0..2000)) {
            let got = select_not_f(&input, |i| input[i] < 25);
            let expected: Vec<u32> = input.iter().copied().filter(|&v| v >= 25).collect();
            prop_assert_eq!(got, expected);
        }
    }
}
