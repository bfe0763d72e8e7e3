/// First offset in `[offset_beg, offset_end)` with `arr[offset] >= val`, scanning forward.
#[inline]
pub fn linear_search<T: Copy + Ord>(arr: &[T], mut offset_beg: usize, offset_end: usize, val: T) -> usize {
    while offset_beg < offset_end && arr[offset_beg] < val {
        offset_beg += 1;
    }
    offset_beg
}

/// Lower bound of `val` in the sorted range `arr[offset_beg..offset_end]`.
///
/// The loop body is a conditional move rather than a branch. Returns `offset_end` when every
/// element is smaller than `val` or the range is empty.
#[inline]
pub fn branch_free_binary_search<T: Copy + Ord>(arr: &[T], offset_beg: usize, offset_end: usize, val: T) -> usize {
    if offset_beg >= offset_end {
        return offset_end;
    }
    let mut base = offset_beg;
    let mut len = offset_end - offset_beg;
    while len > 1 {
        let half = len / 2;
        base = if arr[base + half] < val { base + half } else { base };
        len -= half;
    }
    base + (arr[base] < val) as usize
}

/// Lower bound of `val` in the sorted range `arr[offset_beg..offset_end]`, probing outward
/// from `offset_beg` first.
///
/// Checks the first three slots, then jumps by 4, 8, 16, ... until it overshoots, and
/// finishes with [`branch_free_binary_search`] inside the last jump. Cheap when the answer
/// sits close to `offset_beg`.
pub fn gallop_search<T: Copy + Ord>(arr: &[T], mut offset_beg: usize, offset_end: usize, val: T) -> usize {
    if offset_beg >= offset_end || arr[offset_end - 1] < val {
        return offset_end;
    }
    // arr[offset_end - 1] >= val from here on, so one of these returns for short ranges.
    for _ in 0..3 {
        if offset_beg + 1 > offset_end || arr[offset_beg] >= val {
            return offset_beg;
        }
        offset_beg += 1;
    }

    let mut jump = 4usize;
    loop {
        let peek = offset_beg + jump;
        if peek >= offset_end {
            return branch_free_binary_search(arr, offset_beg, offset_end, val);
        }
        if arr[peek] >= val {
            return branch_free_binary_search(arr, offset_beg, peek + 1, val);
        }
        offset_beg = peek + 1;
        jump <<= 1;
    }
}

/// Row owning the global adjacency index `edge_idx`, that is the `u` with
/// `row_ptrs[u] <= edge_idx < row_ptrs[u + 1]`.
///
/// `u_hint` is the row of a nearby earlier index; the search gallops forward from it, so a
/// scan over consecutive indices costs amortized constant time. Empty rows are skipped.
///
/// # Panics
/// If `edge_idx >= row_ptrs[n]`.
pub fn find_src(row_ptrs: &[usize], u_hint: usize, edge_idx: usize) -> usize {
    let n = row_ptrs.len() - 1;
    assert!(edge_idx < row_ptrs[n], "edge index {edge_idx} past the last row");
    let u_hint = u_hint.min(n - 1);
    if row_ptrs[u_hint] <= edge_idx && edge_idx < row_ptrs[u_hint + 1] {
        return u_hint;
    }
    // First offset strictly above edge_idx, minus one, is the last row starting at or before it.
    let upper = if edge_idx >= row_ptrs[u_hint + 1] {
        gallop_search(row_ptrs, u_hint + 1, row_ptrs.len(), edge_idx + 1)
    } else {
        branch_free_binary_search(row_ptrs, 0, u_hint + 1, edge_idx + 1)
    };
    upper - 1
}
