use std::marker::PhantomData;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Splits `[0, size)` into at most `workers` contiguous ranges of near-equal length.
///
/// Every range but the last has `size / workers` elements; the last one absorbs the remainder.
/// Returns a single empty range for `size == 0` so per-worker histograms are never empty.
pub fn worker_ranges(size: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1).min(size.max(1));
    let avg = size / workers;
    (0..workers)
        .map(|w| {
            let beg = w * avg;
            let end = if w + 1 == workers { size } else { beg + avg };
            beg..end
        })
        .collect()
}

/// Splits `buf` into consecutive mutable pieces whose lengths are `lens`.
pub(crate) fn split_by_lens<'a, T>(mut buf: &'a mut [T], lens: impl IntoIterator<Item = usize>) -> Vec<&'a mut [T]> {
    let mut pieces = Vec::new();
    for len in lens {
        let (piece, rest) = std::mem::take(&mut buf).split_at_mut(len);
        pieces.push(piece);
        buf = rest;
    }
    pieces
}

/// A shared write view over a mutable buffer for scatter phases.
///
/// Several workers write through the same view at the same time. Writers must target
/// pairwise distinct indices; callers obtain those indices by atomic fetch-add on a cursor or
/// from a prefix sum, and the parallel region that writes is joined before the buffer is read.
pub struct SharedSlice<'a, T> {
    ptr: *mut T,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

unsafe impl<T: Send> Send for SharedSlice<'_, T> {}
unsafe impl<T: Send> Sync for SharedSlice<'_, T> {}

impl<'a, T> SharedSlice<'a, T> {
    pub fn new(slice: &'a mut [T]) -> Self {
        Self {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
            _marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Writes `value` at `idx`.
    ///
    /// # Safety
    /// No other thread may read or write `idx` while this view is alive.
    #[inline]
    pub unsafe fn write(&self, idx: usize, value: T) {
        assert!(idx < self.len, "scatter index {idx} out of bounds ({})", self.len);
        // SAFETY: in bounds, and the caller guarantees exclusive access to this slot.
        unsafe { self.ptr.add(idx).write(value) }
    }
}

/// Runs `body` over the chunk indices `[0, num_chunks)` with one scratch context per worker.
///
/// Every worker of the current pool enters once through [`rayon::broadcast`], builds its own
/// context with `init` on its first claimed chunk and then keeps claiming chunk indices from a
/// shared atomic cursor until none is left. The context is owned by the worker for the whole
/// loop, so `body` gets it by `&mut` without any locking. Per-worker results are folded with
/// `merge`, starting from `T::default()`.
pub fn run_chunks<S, T, I, F, M>(num_chunks: usize, init: I, body: F, merge: M) -> T
where
    T: Default + Send,
    I: Fn() -> S + Sync,
    F: Fn(&mut S, usize) -> T + Sync,
    M: Fn(T, T) -> T + Sync,
{
    if num_chunks == 0 {
        return T::default();
    }
    let cursor = AtomicUsize::new(0);
    let partials = rayon::broadcast(|_| {
        let mut scratch: Option<S> = None;
        let mut acc = T::default();
        loop {
            let chunk = cursor.fetch_add(1, Ordering::Relaxed);
            if chunk >= num_chunks {
                break;
            }
            let s = scratch.get_or_insert_with(&init);
            acc = merge(acc, body(s, chunk));
        }
        acc
    });
    partials.into_iter().fold(T::default(), &merge)
}

#[cfg(test)]
mod test_worker {
    use rayon::prelude::*;

    use super::*;

    #[test]
    fn test_worker_ranges_cover_everything() {
        let ranges = worker_ranges(10, 3);
        assert_eq!(ranges, vec![0..3, 3..6, 6..10]);
        assert_eq!(worker_ranges(0, 4), vec![0..0]);
        assert_eq!(worker_ranges(2, 8), vec![0..1, 1..2]);
    }

    #[test]
    fn test_split_by_lens() {
        let mut buf = [1, 2, 3, 4, 5];
        let pieces = split_by_lens(&mut buf, [2, 0, 3]);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0], &[1, 2]);
        assert!(pieces[1].is_empty());
        assert_eq!(pieces[2], &[3, 4, 5]);
    }

    #[test]
    fn test_shared_slice_scatter() {
        let mut out = vec![0u32; 1000];
        let view = SharedSlice::new(&mut out);
        (0..1000usize).into_par_iter().for_each(|i| {
            // SAFETY: every index is written by exactly one iteration.
            unsafe { view.write(999 - i, i as u32) };
        });
        assert!(out.iter().enumerate().all(|(i, &v)| v as usize == 999 - i));
    }

    #[test]
    fn test_run_chunks_visits_every_chunk_once() {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();
        let total = pool.install(|| run_chunks(1000, || 0usize, |_, c| c as u64, |a, b| a + b));
        assert_eq!(total, (0..1000u64).sum());
        assert_eq!(run_chunks(0, || 0usize, |_, c| c as u64, |a, b| a + b), 0);
    }

    #[test]
    fn test_run_chunks_one_context_per_worker() {
        // Every worker counts its own chunks in its scratch; the contexts built never exceed
        // the pool width and together they saw every chunk.
        let pool = rayon::ThreadPoolBuilder::new().num_threads(3).build().unwrap();
        let built = AtomicUsize::new(0);
        let mut seen: Vec<usize> = pool.install(|| {
            run_chunks(
                500,
                || {
                    built.fetch_add(1, Ordering::Relaxed);
                    0usize
                },
                |count, c| {
                    *count += 1;
                    vec![c]
                },
                |mut a, b| {
                    a.extend(b);
                    a
                },
            )
        });
        assert!(built.load(Ordering::Relaxed) <= 3);
        seen.sort_unstable();
        assert_eq!(seen, (0..500).collect::<Vec<_>>());
    }
}
