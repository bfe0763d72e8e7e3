use log::{debug, info};
use rayon::ThreadPoolBuilder;

use crate::algorithms::bitmap::{count_bitmap, count_edge_bitmap};
use crate::algorithms::merge::count_merge;
use crate::algorithms::packed::{count_packed_bitmap, count_packed_merge};
use crate::algorithms::radix::count_radix;
use crate::algorithms::view::{KernelStats, OrientedView, PackedRows};
use crate::algorithms::KernelStrategy;
use crate::config::RunConfig;
use crate::error::{TcError, TcResult};
use crate::io_status::{format_with_commas, PhaseCollector, PhaseStats};
use crate::measure_phase;
use crate::preprocess::{build_csr, build_dodg, dedup_edges, reorder_graph};
use crate::types::{EdgeList, Graph, Orientation, VertexPermutation, MAX_VERTEX_ID};

/// Outcome of one counting run.
///
/// # Fields
/// * `triangle_count` - Number of triangles of the simple graph behind the input.
/// * `vertex_count` - `max vertex id + 1` of the raw input.
/// * `edge_count` - Undirected edges left after deduplication.
/// * `stats` - Workload figures of the kernel.
/// * `phases` - Time, memory and I/O of every phase, in execution order.
/// * `graph` - Final (reordered) graph, kept only when the configuration asks for it.
/// * `permutation` - Relabeling applied to `graph`, present when kept and reordering ran.
#[derive(Debug, Clone)]
pub struct TriangleReport {
    pub triangle_count: u64,
    pub vertex_count: usize,
    pub edge_count: usize,
    pub stats: KernelStats,
    pub phases: Vec<PhaseStats>,
    pub graph: Option<Graph>,
    pub permutation: Option<VertexPermutation>,
}

/// Runs `strategy` over a graph whose rows are sorted.
pub fn count_with_strategy(graph: &Graph, strategy: KernelStrategy, config: &RunConfig) -> KernelStats {
    let view = OrientedView::new(graph);
    let chunk_size = config.chunk_size;
    match strategy {
        KernelStrategy::Bitmap => count_bitmap(&view, chunk_size),
        KernelStrategy::EdgeBitmap => count_edge_bitmap(&view, chunk_size),
        KernelStrategy::RadixHash => count_radix(&view, chunk_size),
        KernelStrategy::Merge => count_merge(&view, chunk_size),
        KernelStrategy::PackedBitmap => {
            let packed = PackedRows::build(&view, config.packed_range(view.vertex_count()));
            count_packed_bitmap(&view, &packed, chunk_size)
        }
        KernelStrategy::PackedMerge => {
            let packed = PackedRows::build(&view, config.packed_range(view.vertex_count()));
            count_packed_merge(&view, &packed, chunk_size)
        }
    }
}

/// Controller for triangle counting.
///
/// Owns a [`RunConfig`] and executes dedup, CSR or DODG construction, optional reordering and
/// the configured kernel inside a dedicated thread pool of `thread_num` workers.
pub struct TriangleController {
    config: RunConfig,
}

impl TriangleController {
    /// Creates a new controller with the given configuration.
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Counts the triangles of `edges`.
    ///
    /// # Returns
    /// The report, or an error when the configuration is invalid, an id is above
    /// [`MAX_VERTEX_ID`] or the pool cannot start.
    pub fn run(&self, edges: EdgeList) -> TcResult<TriangleReport> {
        self.config.validate()?;
        if let Some(max_id) = edges.max_vertex_id().filter(|&id| id > MAX_VERTEX_ID) {
            return Err(TcError::InvalidInput(format!("vertex id {max_id} is reserved")));
        }
        let thread_num = self.config.effective_threads();
        let pool = ThreadPoolBuilder::new().num_threads(thread_num).build()?;
        info!(
            "counting with {:?} on {:?} input, {} threads, reorder {}",
            self.config.strategy, self.config.orientation, thread_num, self.config.reorder
        );
        Ok(pool.install(|| self.run_in_pool(edges)))
    }

    fn run_in_pool(&self, edges: EdgeList) -> TriangleReport {
        let config = &self.config;
        let mut phases = PhaseCollector::new();
        let raw_edges = edges.len();

        // Step 1. Deduplicate.
        let dedup = measure_phase!(phases, "dedup", { dedup_edges(edges) });
        let vertex_count = dedup.vertex_count();
        let edge_count = dedup.edges.len();
        info!(
            "[dedup] {} -> {} edges over {} vertices",
            format_with_commas(raw_edges as u64),
            format_with_commas(edge_count as u64),
            format_with_commas(vertex_count as u64)
        );

        // Step 2. Build the adjacency structure.
        let (graph, degrees) = measure_phase!(phases, "build", {
            match config.orientation {
                Orientation::Symmetric => {
                    let graph = build_csr(&dedup.edges, vertex_count);
                    let degrees = graph.degrees();
                    (graph, degrees)
                }
                Orientation::DegreeOriented => {
                    let dodg = build_dodg(&dedup.edges, vertex_count);
                    (dodg.graph, dodg.degrees)
                }
            }
        });
        drop(dedup);

        // Step 3. Relabel, or at least sort the rows.
        let (graph, permutation) = if config.reorder {
            let (graph, permutation) = measure_phase!(phases, "reorder", {
                reorder_graph(&graph, &degrees, config.local_budget_bytes)
            });
            (graph, Some(permutation))
        } else {
            let mut graph = graph;
            measure_phase!(phases, "sort_rows", { graph.sort_rows() });
            (graph, None)
        };
        drop(degrees);

        // Step 4. Count.
        let stats = measure_phase!(phases, "count", {
            count_with_strategy(&graph, config.strategy, config)
        });
        debug!(
            "kernel {:?}: {} probes, max forward degree {}",
            config.strategy,
            format_with_commas(stats.probes),
            stats.max_forward_degree
        );
        info!(
            "[count] {} triangles in {:.3} ms total",
            format_with_commas(stats.triangle_count),
            phases.total_duration().as_secs_f64() * 1000.0
        );

        let (graph, permutation) = if config.keep_graph {
            (Some(graph), permutation)
        } else {
            (None, None)
        };
        TriangleReport {
            triangle_count: stats.triangle_count,
            vertex_count,
            edge_count,
            stats,
            phases: phases.into_phases(),
            graph,
            permutation,
        }
    }
}

/// Counts the triangles of `edges` with `config`.
pub fn count_triangles(edges: EdgeList, config: &RunConfig) -> TcResult<u64> {
    let report = TriangleController::new(config.clone()).run(edges)?;
    Ok(report.triangle_count)
}
