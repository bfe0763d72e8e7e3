use crate::config::RADIX_HEURISTIC_FACTOR;
use crate::primitives::bit_array::BitArray;
use crate::types::VertexId;

/// Largest power of two not above `deg`, one for an empty range.
#[inline]
pub fn get_part_size(deg: usize) -> usize {
    if deg <= 1 {
        1
    } else {
        1usize << (usize::BITS - 1 - deg.leading_zeros())
    }
}

/// Number of radix buckets used for a range of `deg` keys.
#[inline]
pub fn radix_table_size(deg: usize) -> usize {
    get_part_size(deg) * RADIX_HEURISTIC_FACTOR
}

/// Occupancy bits of a radix table: bit `b` is set when some key has low bits `b`.
///
/// A clear bit proves absence. A set bit only says the bucket is worth probing.
#[derive(Debug, Clone)]
pub struct RadixFilter {
    mask: u32,
    occupied: BitArray,
}

impl Default for RadixFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl RadixFilter {
    pub fn new() -> Self {
        Self {
            mask: 0,
            occupied: BitArray::new(0),
        }
    }

    /// Rebuilds the filter over `keys`, reusing the bit storage.
    ///
    /// `previous` must be the key set of the last construction; only its bits are cleared.
    pub fn construct(&mut self, previous: &[VertexId], keys: &[VertexId]) {
        for &key in previous {
            self.occupied.clear((key & self.mask) as usize);
        }
        let table_size = radix_table_size(keys.len());
        self.occupied.ensure_len(table_size);
        self.mask = (table_size - 1) as u32;
        for &key in keys {
            self.occupied.set((key & self.mask) as usize);
        }
    }

    #[inline]
    pub fn mask(&self) -> u32 {
        self.mask
    }

    #[inline]
    pub fn may_contain(&self, key: VertexId) -> bool {
        self.occupied.get((key & self.mask) as usize)
    }
}

/// A radix hash set over the adjacency range of one vertex.
///
/// Keys are bucketed by their low bits. Construction is a histogram, a prefix sum and a
/// scatter, all linear in the number of keys. A lookup checks the occupancy bit first and
/// scans the single matching bucket only when it is set. All buffers are reused across
/// constructions, so a worker keeps one set for its whole lifetime.
#[derive(Debug, Clone, Default)]
pub struct RadixSet {
    filter: RadixFilter,
    bucket_ptrs: Vec<u32>,
    cursors: Vec<u32>,
    keys: Vec<VertexId>,
}

impl RadixSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the set over `keys`.
    pub fn construct(&mut self, keys: &[VertexId]) {
        let previous = std::mem::take(&mut self.keys);
        self.filter.construct(&previous, keys);
        let mask = self.filter.mask();
        let table_size = mask as usize + 1;

        // Step 1. Histogram, shifted by one slot.
        self.bucket_ptrs.clear();
        self.bucket_ptrs.resize(table_size + 1, 0);
        for &key in keys {
            self.bucket_ptrs[(key & mask) as usize + 1] += 1;
        }

        // Step 2. Prefix sum.
        for b in 0..table_size {
            self.bucket_ptrs[b + 1] += self.bucket_ptrs[b];
        }

        // Step 3. Scatter, reusing the old key buffer.
        let mut slots = previous;
        slots.clear();
        slots.resize(keys.len(), 0);
        self.cursors.clear();
        self.cursors.extend_from_slice(&self.bucket_ptrs[..table_size]);
        for &key in keys {
            let b = (key & mask) as usize;
            slots[self.cursors[b] as usize] = key;
            self.cursors[b] += 1;
        }
        self.keys = slots;
    }

    #[inline]
    pub fn contains(&self, key: VertexId) -> bool {
        if !self.filter.may_contain(key) {
            return false;
        }
        let b = (key & self.filter.mask()) as usize;
        let bucket = &self.keys[self.bucket_ptrs[b] as usize..self.bucket_ptrs[b + 1] as usize];
        bucket.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod test_radix_set {
    use super::*;

    #[test]
    fn test_part_size() {
        assert_eq!(get_part_size(0), 1);
        assert_eq!(get_part_size(1), 1);
        assert_eq!(get_part_size(7), 4);
        assert_eq!(get_part_size(8), 8);
        assert_eq!(radix_table_size(5), 4 * RADIX_HEURISTIC_FACTOR);
    }

    #[test]
    fn test_membership() {
        let keys: Vec<u32> = (0..300).map(|i| i * 257 + 3).collect();
        let mut set = RadixSet::new();
        set.construct(&keys);
        assert_eq!(set.len(), keys.len());
        for &k in &keys {
            assert!(set.contains(k));
        }
        for probe in (0..100_000).step_by(7) {
            assert_eq!(set.contains(probe), keys.binary_search(&probe).is_ok());
        }
    }

    #[test]
    fn test_reconstruction_forgets_old_keys() {
        let mut set = RadixSet::new();
        set.construct(&[1, 2, 3, 1000]);
        set.construct(&[5, 6]);
        assert!(!set.contains(1000));
        assert!(!set.contains(1));
        assert!(set.contains(6));
        set.construct(&[]);
        assert!(set.is_empty());
        assert!(!set.contains(5));
    }

    #[test]
    fn test_filter_has_no_false_negatives() {
        let keys = [10u32, 77, 4096, 123_456];
        let mut filter = RadixFilter::new();
        filter.construct(&[], &keys);
        assert!(keys.iter().all(|&k| filter.may_contain(k)));
    }
}
