use proptest::prelude::*;
use tricount::algorithms::count_triangles_reference;
use tricount::preprocess::{build_csr, dedup_edges, degree_descending_order, verify_canonical};
use tricount::{count_triangles, EdgeList, KernelStrategy, Orientation, RunConfig};

fn edge_lists() -> impl Strategy<Value = EdgeList> {
    prop::collection::vec((0u32..120, 0u32..120), 0..800).prop_map(EdgeList::from_pairs)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn dedup_output_is_canonical_and_idempotent(edges in edge_lists()) {
        let once = dedup_edges(edges);
        prop_assert!(verify_canonical(&once.edges));
        let twice = dedup_edges(once.edges.clone());
        prop_assert_eq!(twice.edges, once.edges);
    }

    #[test]
    fn permutation_is_bijective(edges in edge_lists()) {
        let dedup = dedup_edges(edges);
        let graph = build_csr(&dedup.edges, dedup.vertex_count());
        let permutation = degree_descending_order(&graph.degrees(), 512);
        let n = graph.vertex_count;
        let mut seen = vec![false; n];
        for old_id in 0..n as u32 {
            let new_id = permutation.new_id(old_id);
            prop_assert!(!seen[new_id as usize]);
            seen[new_id as usize] = true;
            prop_assert_eq!(permutation.old_id(new_id), old_id);
        }
    }

    #[test]
    fn kernels_agree_with_reference(edges in edge_lists(), orientation_is_dodg in any::<bool>(), reorder in any::<bool>()) {
        let expected = count_triangles_reference(&edges);
        for strategy in KernelStrategy::ALL {
            let config = RunConfig {
                thread_num: 3,
                strategy,
                orientation: if orientation_is_dodg { Orientation::DegreeOriented } else { Orientation::Symmetric },
                reorder,
                pack_threshold: 64,
                chunk_size: 5,
                ..RunConfig::default()
            };
            prop_assert_eq!(count_triangles(edges.clone(), &config).unwrap(), expected, "{}", strategy);
        }
    }
}
