/// A fixed-length bit vector backed by `u64` words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitArray {
    words: Vec<u64>,
    len: usize,
}

impl BitArray {
    /// A bit array of `len` cleared bits.
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0u64; len.div_ceil(64)],
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn set(&mut self, idx: usize) {
        debug_assert!(idx < self.len);
        self.words[idx >> 6] |= 1u64 << (idx & 63);
    }

    #[inline]
    pub fn clear(&mut self, idx: usize) {
        debug_assert!(idx < self.len);
        self.words[idx >> 6] &= !(1u64 << (idx & 63));
    }

    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        debug_assert!(idx < self.len);
        self.words[idx >> 6] & (1u64 << (idx & 63)) != 0
    }

    /// Clears every bit.
    pub fn reset_all(&mut self) {
        self.words.fill(0);
    }

    /// Grows to at least `len` bits. Existing bits are kept, new ones are cleared.
    pub fn ensure_len(&mut self, len: usize) {
        if len > self.len {
            self.words.resize(len.div_ceil(64), 0);
            self.len = len;
        }
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }
}

#[cfg(test)]
mod test_bit_array {
    use super::*;

    #[test]
    fn test_set_get_clear() {
        let mut bits = BitArray::new(130);
        assert_eq!(bits.words().len(), 3);
        for idx in [0, 63, 64, 129] {
            bits.set(idx);
        }
        assert!(bits.get(63) && bits.get(64) && bits.get(129));
        assert!(!bits.get(1));
        assert_eq!(bits.count_ones(), 4);
        bits.clear(64);
        assert!(!bits.get(64));
        bits.reset_all();
        assert_eq!(bits.count_ones(), 0);
    }

    #[test]
    fn test_ensure_len_keeps_bits() {
        let mut bits = BitArray::new(10);
        bits.set(9);
        bits.ensure_len(200);
        assert_eq!(bits.len(), 200);
        assert!(bits.get(9));
        assert!(!bits.get(199));
    }
}
