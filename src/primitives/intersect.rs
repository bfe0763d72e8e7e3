use std::sync::OnceLock;

use crate::config::GALLOP_SKEW_RATIO;
use crate::primitives::search::gallop_search;
use crate::types::VertexId;

/// Vector width used by the block merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SimdLevel {
    Scalar,
    /// 4 lanes of 32 bits.
    Sse2,
    /// 8 lanes of 32 bits.
    Avx2,
    /// 16 lanes of 32 bits.
    Avx512,
}

impl SimdLevel {
    /// Widest level supported by the running CPU.
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("avx512f") {
                return SimdLevel::Avx512;
            }
            if is_x86_feature_detected!("avx2") {
                return SimdLevel::Avx2;
            }
            if is_x86_feature_detected!("sse2") {
                return SimdLevel::Sse2;
            }
        }
        SimdLevel::Scalar
    }

    /// Level detected once per process.
    pub fn cached() -> Self {
        static LEVEL: OnceLock<SimdLevel> = OnceLock::new();
        *LEVEL.get_or_init(SimdLevel::detect)
    }

    pub fn lanes(self) -> usize {
        match self {
            SimdLevel::Scalar => 1,
            SimdLevel::Sse2 => 4,
            SimdLevel::Avx2 => 8,
            SimdLevel::Avx512 => 16,
        }
    }

    /// Whether this level can run here; forcing an unsupported level falls back to scalar.
    pub fn is_supported(self) -> bool {
        self <= Self::cached()
    }
}

/// Two-pointer merge count of the common elements of two ascending ranges.
pub fn count_common_scalar(a: &[VertexId], b: &[VertexId]) -> usize {
    let (mut i, mut j, mut count) = (0usize, 0usize, 0usize);
    while i < a.len() && j < b.len() {
        if a[i] < b[j] {
            i += 1;
        } else if a[i] > b[j] {
            j += 1;
        } else {
            count += 1;
            i += 1;
            j += 1;
        }
    }
    count
}

/// Counts common elements by galloping through `large` once per element of `small`.
pub fn count_common_gallop(small: &[VertexId], large: &[VertexId]) -> usize {
    let mut pos = 0usize;
    let mut count = 0usize;
    for &val in small {
        pos = gallop_search(large, pos, large.len(), val);
        if pos == large.len() {
            break;
        }
        if large[pos] == val {
            count += 1;
            pos += 1;
        }
    }
    count
}

/// Block merge count at a forced vector width.
///
/// Blocks of `lanes` elements are compared all-against-all; afterwards the block with the
/// smaller maximum advances (both advance on equal maxima). The tails go through the scalar
/// merge. Elements of each range must be strictly ascending.
pub fn count_common_simd(a: &[VertexId], b: &[VertexId], level: SimdLevel) -> usize {
    if !level.is_supported() {
        return count_common_scalar(a, b);
    }
    match level {
        SimdLevel::Scalar => count_common_scalar(a, b),
        #[cfg(target_arch = "x86_64")]
        // SAFETY: is_supported() confirmed the feature on this CPU.
        SimdLevel::Sse2 => unsafe { x86::count_common_sse2(a, b) },
        #[cfg(target_arch = "x86_64")]
        // SAFETY: as above.
        SimdLevel::Avx2 => unsafe { x86::count_common_avx2(a, b) },
        #[cfg(target_arch = "x86_64")]
        // SAFETY: as above.
        SimdLevel::Avx512 => unsafe { x86::count_common_avx512(a, b) },
        #[cfg(not(target_arch = "x86_64"))]
        _ => count_common_scalar(a, b),
    }
}

/// Counts the common elements of two strictly ascending ranges.
///
/// Gallops when one range is more than [`GALLOP_SKEW_RATIO`] times longer than the other and
/// runs the widest available block merge otherwise.
pub fn count_common(a: &[VertexId], b: &[VertexId]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if large.len() > small.len() * GALLOP_SKEW_RATIO {
        count_common_gallop(small, large)
    } else {
        count_common_simd(a, b, SimdLevel::cached())
    }
}

#[cfg(target_arch = "x86_64")]
mod x86 {
    use std::arch::x86_64::*;

    use super::count_common_scalar;
    use crate::types::VertexId;

    #[target_feature(enable = "sse2")]
    pub(super) unsafe fn count_common_sse2(a: &[VertexId], b: &[VertexId]) -> usize {
        const LANES: usize = 4;
        let (mut i_a, mut i_b, mut count) = (0usize, 0usize, 0usize);
        while i_a + LANES <= a.len() && i_b + LANES <= b.len() {
            let va = _mm_loadu_si128(a.as_ptr().add(i_a) as *const __m128i);
            let vb = _mm_loadu_si128(b.as_ptr().add(i_b) as *const __m128i);
            let rot1 = _mm_shuffle_epi32(vb, 0b00_11_10_01);
            let rot2 = _mm_shuffle_epi32(vb, 0b01_00_11_10);
            let rot3 = _mm_shuffle_epi32(vb, 0b10_01_00_11);
            let hits = _mm_or_si128(
                _mm_or_si128(_mm_cmpeq_epi32(va, vb), _mm_cmpeq_epi32(va, rot1)),
                _mm_or_si128(_mm_cmpeq_epi32(va, rot2), _mm_cmpeq_epi32(va, rot3)),
            );
            count += _mm_movemask_ps(_mm_castsi128_ps(hits)).count_ones() as usize;

            let a_max = a[i_a + LANES - 1];
            let b_max = b[i_b + LANES - 1];
            i_a += (a_max <= b_max) as usize * LANES;
            i_b += (a_max >= b_max) as usize * LANES;
        }
        count + count_common_scalar(&a[i_a..], &b[i_b..])
    }

    #[target_feature(enable = "avx2")]
    pub(super) unsafe fn count_common_avx2(a: &[VertexId], b: &[VertexId]) -> usize {
        const LANES: usize = 8;
        let rotate = _mm256_setr_epi32(1, 2, 3, 4, 5, 6, 7, 0);
        let (mut i_a, mut i_b, mut count) = (0usize, 0usize, 0usize);
        while i_a + LANES <= a.len() && i_b + LANES <= b.len() {
            let va = _mm256_loadu_si256(a.as_ptr().add(i_a) as *const __m256i);
            let mut vb = _mm256_loadu_si256(b.as_ptr().add(i_b) as *const __m256i);
            let mut hits = _mm256_cmpeq_epi32(va, vb);
            for _ in 1..LANES {
                vb = _mm256_permutevar8x32_epi32(vb, rotate);
                hits = _mm256_or_si256(hits, _mm256_cmpeq_epi32(va, vb));
            }
            count += _mm256_movemask_ps(_mm256_castsi256_ps(hits)).count_ones() as usize;

            let a_max = a[i_a + LANES - 1];
            let b_max = b[i_b + LANES - 1];
            i_a += (a_max <= b_max) as usize * LANES;
            i_b += (a_max >= b_max) as usize * LANES;
        }
        count + count_common_scalar(&a[i_a..], &b[i_b..])
    }

    #[target_feature(enable = "avx512f")]
    pub(super) unsafe fn count_common_avx512(a: &[VertexId], b: &[VertexId]) -> usize {
        const LANES: usize = 16;
        let rotate = _mm512_setr_epi32(1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 0);
        let (mut i_a, mut i_b, mut count) = (0usize, 0usize, 0usize);
        while i_a + LANES <= a.len() && i_b + LANES <= b.len() {
            let va = _mm512_loadu_epi32(a.as_ptr().add(i_a) as *const i32);
            let mut vb = _mm512_loadu_epi32(b.as_ptr().add(i_b) as *const i32);
            let mut hits: __mmask16 = _mm512_cmpeq_epi32_mask(va, vb);
            for _ in 1..LANES {
                vb = _mm512_permutexvar_epi32(rotate, vb);
                hits |= _mm512_cmpeq_epi32_mask(va, vb);
            }
            count += hits.count_ones() as usize;

            let a_max = a[i_a + LANES - 1];
            let b_max = b[i_b + LANES - 1];
            i_a += (a_max <= b_max) as usize * LANES;
            i_b += (a_max >= b_max) as usize * LANES;
        }
        count + count_common_scalar(&a[i_a..], &b[i_b..])
    }
}
