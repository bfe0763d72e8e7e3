//! Deterministic synthetic edge lists with known triangle counts.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{EdgeList, VertexId};

/// Complete graph `K_n`; it has `n (n - 1) (n - 2) / 6` triangles.
pub fn complete_graph(n: u32) -> EdgeList {
    (0..n).flat_map(|u| (u + 1..n).map(move |v| (u, v))).collect()
}

/// Star with hub `0` and leaves `1..=leaves`; triangle free.
pub fn star_graph(leaves: u32) -> EdgeList {
    (1..=leaves).map(|v| (0, v)).collect()
}

/// Wheel on `n` vertices: hub `0` joined to a rim cycle `1..n`.
///
/// For `n >= 5` it has exactly `n - 1` triangles, one per rim edge.
pub fn wheel_graph(n: u32) -> EdgeList {
    assert!(n >= 4, "a wheel needs a hub and a rim of at least three vertices");
    let rim = n - 1;
    let spokes = (1..n).map(|v| (0, v));
    let cycle = (0..rim).map(move |i| (1 + i, 1 + (i + 1) % rim));
    spokes.chain(cycle).collect()
}

/// `rows x cols` grid, each vertex joined to its right and lower neighbor; triangle free.
pub fn grid_graph(rows: u32, cols: u32) -> EdgeList {
    let id = move |r: u32, c: u32| -> VertexId { r * cols + c };
    let mut pairs = Vec::new();
    for r in 0..rows {
        for c in 0..cols {
            if c + 1 < cols {
                pairs.push((id(r, c), id(r, c + 1)));
            }
            if r + 1 < rows {
                pairs.push((id(r, c), id(r + 1, c)));
            }
        }
    }
    EdgeList::from_pairs(pairs)
}

/// `m` uniformly random endpoint pairs over `[0, n)` from a seeded generator.
///
/// Self-loops and duplicates are left in on purpose, so the output doubles as a noisy input.
pub fn random_graph(n: u32, m: usize, seed: u64) -> EdgeList {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..m).map(|_| (rng.gen_range(0..n), rng.gen_range(0..n))).collect()
}

/// `m` random pairs where endpoint ids follow a rough power law, giving hub vertices.
pub fn skewed_graph(n: u32, m: usize, seed: u64) -> EdgeList {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut skewed = move || -> VertexId {
        let x: f64 = rng.gen();
        ((x * x * x) * n as f64) as VertexId % n
    };
    (0..m).map(|_| (skewed(), skewed())).collect()
}

#[cfg(test)]
mod test_graph_gen {
    use super::*;
    use crate::algorithms::count_triangles_reference;

    #[test]
    fn test_known_counts() {
        assert_eq!(count_triangles_reference(&complete_graph(7)), 35);
        assert_eq!(count_triangles_reference(&star_graph(50)), 0);
        assert_eq!(count_triangles_reference(&wheel_graph(10)), 9);
        assert_eq!(count_triangles_reference(&grid_graph(6, 9)), 0);
    }

    #[test]
    fn test_random_is_seeded() {
        assert_eq!(random_graph(100, 50, 3), random_graph(100, 50, 3));
        assert!(random_graph(100, 50, 3).iter().all(|e| e.src < 100 && e.dst < 100));
        assert!(skewed_graph(100, 500, 1).iter().all(|e| e.src < 100 && e.dst < 100));
    }
}
