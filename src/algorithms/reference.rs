use rustc_hash::{FxHashMap, FxHashSet};

use crate::types::{EdgeList, VertexId};

/// Sequential brute-force triangle count of a raw edge list.
///
/// Self-loops and repeated edges are ignored. Every triangle `a < b < c` is found once, from
/// its edge `(a, b)`, by checking the higher neighbors `c` of `b` against the edge set.
pub fn count_triangles_reference(edges: &EdgeList) -> u64 {
    let mut edge_set = FxHashSet::default();
    let mut higher: FxHashMap<VertexId, Vec<VertexId>> = FxHashMap::default();
    for edge in edges.iter() {
        let edge = edge.canonical();
        if edge.is_self_loop() || !edge_set.insert((edge.src, edge.dst)) {
            continue;
        }
        higher.entry(edge.src).or_default().push(edge.dst);
    }

    let mut count = 0u64;
    for &(a, b) in &edge_set {
        if let Some(candidates) = higher.get(&b) {
            count += candidates.iter().filter(|&&c| edge_set.contains(&(a, c))).count() as u64;
        }
    }
    count
}

#[cfg(test)]
mod test_reference {
    use super::*;

    #[test]
    fn test_small_cases() {
        assert_eq!(count_triangles_reference(&EdgeList::from_pairs([(0, 1), (1, 2), (2, 0), (0, 3)])), 1);
        assert_eq!(count_triangles_reference(&EdgeList::from_pairs([(1, 0), (0, 1), (2, 2), (0, 2), (2, 1)])), 1);
        assert_eq!(count_triangles_reference(&EdgeList::default()), 0);
        // K4
        let k4 = EdgeList::from_pairs([(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        assert_eq!(count_triangles_reference(&k4), 4);
    }
}
