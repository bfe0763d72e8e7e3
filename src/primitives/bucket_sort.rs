use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::config::CACHE_LINE_ENTRY;
use crate::primitives::prefix_sum::inclusive_prefix_sum_into;
use crate::primitives::worker::{worker_ranges, SharedSlice};

/// Output of a bucket sort.
///
/// # Fields
/// * `output` - The input elements grouped by bucket, bucket `b` at
///   `output[bucket_ptrs[b]..bucket_ptrs[b + 1]]`. Order inside a bucket is unspecified.
/// * `bucket_ptrs` - `num_buckets + 1` offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSorted<T> {
    pub output: Vec<T>,
    pub bucket_ptrs: Vec<usize>,
}

impl<T> BucketSorted<T> {
    pub fn bucket(&self, b: usize) -> &[T] {
        &self.output[self.bucket_ptrs[b]..self.bucket_ptrs[b + 1]]
    }

    pub fn bucket_mut(&mut self, b: usize) -> &mut [T] {
        &mut self.output[self.bucket_ptrs[b]..self.bucket_ptrs[b + 1]]
    }

    pub fn num_buckets(&self) -> usize {
        self.bucket_ptrs.len() - 1
    }
}

fn bucket_offsets(counts: &[AtomicUsize]) -> Vec<usize> {
    let mut bucket_ptrs = vec![0usize; counts.len() + 1];
    inclusive_prefix_sum_into(&mut bucket_ptrs[1..], |b| counts[b].load(Ordering::Relaxed));
    bucket_ptrs
}

fn check_cursors(cursors: &[AtomicUsize], bucket_ptrs: &[usize]) {
    let filled = cursors
        .par_iter()
        .enumerate()
        .all(|(b, cursor)| cursor.load(Ordering::Relaxed) == bucket_ptrs[b + 1]);
    assert!(filled, "bucket write cursors must end at the next bucket offset");
}

/// Partitions `input` into `num_buckets` buckets with `bucket_of(i)`.
///
/// Histogram, prefix sum and scatter all go through one shared atomic counter per bucket.
/// This is fine when buckets far outnumber workers.
///
/// # Panics
/// If `bucket_of` returns an id `>= num_buckets`.
pub fn bucket_sort<T, F>(input: &[T], num_buckets: usize, bucket_of: F) -> BucketSorted<T>
where
    T: Copy + Default + Send + Sync,
    F: Fn(usize) -> usize + Sync,
{
    assert!(num_buckets > 0, "bucket sort needs at least one bucket");
    let counts: Vec<AtomicUsize> = (0..num_buckets).map(|_| AtomicUsize::new(0)).collect();
    (0..input.len()).into_par_iter().for_each(|i| {
        counts[bucket_of(i)].fetch_add(1, Ordering::Relaxed);
    });
    let bucket_ptrs = bucket_offsets(&counts);

    let cursors: Vec<AtomicUsize> = bucket_ptrs[..num_buckets].iter().map(|&p| AtomicUsize::new(p)).collect();
    let mut output = vec![T::default(); input.len()];
    let view = SharedSlice::new(&mut output);
    input.par_iter().enumerate().for_each(|(i, item)| {
        let slot = cursors[bucket_of(i)].fetch_add(1, Ordering::Relaxed);
        // SAFETY: fetch_add hands out every slot of the bucket once.
        unsafe { view.write(slot, *item) };
    });
    check_cursors(&cursors, &bucket_ptrs);
    BucketSorted { output, bucket_ptrs }
}

/// Capacity of one per-bucket write-ahead buffer, at least one cache line of entries.
pub fn buffer_capacity<T>(num_buckets: usize, budget_bytes: usize, chunk_len: usize) -> usize {
    let per_bucket = budget_bytes / num_buckets.max(1) / std::mem::size_of::<T>().max(1);
    per_bucket.max(CACHE_LINE_ENTRY).min(chunk_len.max(1))
}

/// Partitions `input` like [`bucket_sort`], batching writes through worker-local buffers.
///
/// Each worker counts its range locally, so the histogram touches no shared counter. During
/// the scatter every bucket gets a write-ahead buffer of [`buffer_capacity`] elements; a full
/// buffer claims its whole run of slots with one fetch-add. With few buckets (bucketing by
/// degree) this removes nearly all contention on the cursors.
pub fn bucket_sort_buffered<T, F>(
    input: &[T],
    num_buckets: usize,
    budget_bytes: usize,
    bucket_of: F,
) -> BucketSorted<T>
where
    T: Copy + Default + Send + Sync,
    F: Fn(usize) -> usize + Sync,
{
    assert!(num_buckets > 0, "bucket sort needs at least one bucket");
    let ranges = worker_ranges(input.len(), rayon::current_num_threads());

    // Step 1. Worker-local histograms folded into the shared counts.
    let counts: Vec<AtomicUsize> = (0..num_buckets).map(|_| AtomicUsize::new(0)).collect();
    ranges.par_iter().for_each(|range| {
        let mut local = vec![0usize; num_buckets];
        for i in range.clone() {
            local[bucket_of(i)] += 1;
        }
        for (b, &c) in local.iter().enumerate() {
            if c > 0 {
                counts[b].fetch_add(c, Ordering::Relaxed);
            }
        }
    });
    let bucket_ptrs = bucket_offsets(&counts);

    // Step 2. Buffered scatter.
    let cursors: Vec<AtomicUsize> = bucket_ptrs[..num_buckets].iter().map(|&p| AtomicUsize::new(p)).collect();
    let mut output = vec![T::default(); input.len()];
    let view = SharedSlice::new(&mut output);
    ranges.par_iter().for_each(|range| {
        let capacity = buffer_capacity::<T>(num_buckets, budget_bytes, range.len());
        let mut buffers: Vec<Vec<T>> = (0..num_buckets).map(|_| Vec::new()).collect();
        let flush = |b: usize, buffer: &mut Vec<T>| {
            let start = cursors[b].fetch_add(buffer.len(), Ordering::Relaxed);
            for (k, item) in buffer.drain(..).enumerate() {
                // SAFETY: the fetch_add above reserved start..start + len for this worker.
                unsafe { view.write(start + k, item) };
            }
        };
        for i in range.clone() {
            let b = bucket_of(i);
            let buffer = &mut buffers[b];
            if buffer.capacity() == 0 {
                buffer.reserve_exact(capacity);
            }
            buffer.push(input[i]);
            if buffer.len() >= capacity {
                flush(b, buffer);
            }
        }
        for (b, buffer) in buffers.iter_mut().enumerate() {
            if !buffer.is_empty() {
                flush(b, buffer);
            }
        }
    });
    check_cursors(&cursors, &bucket_ptrs);
    BucketSorted { output, bucket_ptrs }
}

#[cfg(test)]
mod test_bucket_sort {
    use proptest::prelude::*;

    use super::*;

    fn assert_partitioned(sorted: &BucketSorted<u32>, input: &[u32], num_buckets: usize) {
        assert_eq!(sorted.bucket_ptrs.len(), num_buckets + 1);
        assert_eq!(sorted.bucket_ptrs[num_buckets], input.len());
        for b in 0..num_buckets {
            assert!(sorted.bucket(b).iter().all(|&v| v as usize % num_buckets == b));
        }
        let mut got = sorted.output.clone();
        let mut expected = input.to_vec();
        got.sort_unstable();
        expected.sort_unstable();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_naive_bucket_sort() {
        let input: Vec<u32> = (0..5000).map(|i| (i * 31) % 977).collect();
        let sorted = bucket_sort(&input, 7, |i| input[i] as usize % 7);
        assert_partitioned(&sorted, &input, 7);
    }

    #[test]
    fn test_buffered_bucket_sort_small_budget() {
        let input: Vec<u32> = (0..5000).map(|i| (i * 31) % 977).collect();
        // A tiny budget forces many flushes.
        let sorted = bucket_sort_buffered(&input, 3, 64, |i| input[i] as usize % 3);
        assert_partitioned(&sorted, &input, 3);
    }

    #[test]
    fn test_empty_input() {
        let input: Vec<u32> = Vec::new();
        let sorted = bucket_sort_buffered(&input, 4, 1024, |_| 0);
        assert_eq!(sorted.bucket_ptrs, vec![0; 5]);
        assert!(sorted.output.is_empty());
    }

    #[test]
    fn test_buffer_capacity_bounds() {
        assert_eq!(buffer_capacity::<u32>(1_000_000, 1024, 10_000), CACHE_LINE_ENTRY);
        assert_eq!(buffer_capacity::<u32>(4, 1024, 10_000), 64);
        assert_eq!(buffer_capacity::<u32>(4, 1024, 10), 10);
    }

    proptest! {
        #[test]
        fn prop_variants_agree_per_bucket(input in prop::collection::vec(0u32..1000, 0..3000), buckets in 1usize..40) {
            let naive = bucket_sort(&input, buckets, |i| input[i] as usize % buckets);
            let buffered = bucket_sort_buffered(&input, buckets, 256, |i| input[i] as usize % buckets);
            prop_assert_eq!(&naive.bucket_ptrs, &buffered.bucket_ptrs);
            for b in 0..buckets {
                let mut x = naive.bucket(b).to_vec();
                let mut y = buffered.bucket(b).to_vec();
                x.sort_unstable();
                y.sort_unstable();
                prop_assert_eq!(x, y);
            }
        }
    }
}
