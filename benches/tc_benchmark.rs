use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tricount::algorithms::count_with_strategy;
use tricount::graph_gen::skewed_graph;
use tricount::preprocess::{build_dodg, dedup_edges, reorder_graph};
use tricount::primitives::{count_common_simd, SimdLevel};
use tricount::{KernelStrategy, RunConfig};

fn kernels(c: &mut Criterion) {
    let dedup = dedup_edges(skewed_graph(100_000, 1_000_000, 42));
    let dodg = build_dodg(&dedup.edges, dedup.vertex_count());
    let config = RunConfig::default();
    let (graph, _) = reorder_graph(&dodg.graph, &dodg.degrees, config.local_budget_bytes);

    let mut group = c.benchmark_group("kernels");
    group.sample_size(10);
    for strategy in KernelStrategy::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(strategy), &strategy, |b, &strategy| {
            b.iter(|| count_with_strategy(&graph, strategy, &config).triangle_count)
        });
    }
    group.finish();
}

fn intersections(c: &mut Criterion) {
    let a: Vec<u32> = (0..4096).map(|i| i * 3).collect();
    let b: Vec<u32> = (0..4096).map(|i| i * 5).collect();
    let mut group = c.benchmark_group("intersect");
    for level in [SimdLevel::Scalar, SimdLevel::Sse2, SimdLevel::Avx2, SimdLevel::Avx512] {
        group.bench_with_input(BenchmarkId::from_parameter(format!("{level:?}")), &level, |bench, &level| {
            bench.iter(|| count_common_simd(&a, &b, level))
        });
    }
    group.finish();
}

criterion_group!(benches, kernels, intersections);
criterion_main!(benches);
