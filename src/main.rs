use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use log::info;
use serde::Serialize;
use tricount::io_status::{format_with_commas, PhaseCollector};
use tricount::loader::{load_edge_list, write_binary_edge_list, EdgeListFormat};
use tricount::measure_phase;
use tricount::preprocess::{build_csr, dedup_edges};
use tricount::{KernelStrategy, Orientation, RunConfig, TriangleController};

#[derive(Parser, Debug, Serialize)]
#[command(author, version, about)]
struct Args {
    /// Edge list file (`.bin` for binary u32 pairs, anything else is read as text).
    #[arg(short, long)]
    input: PathBuf,

    /// Input encoding, guessed from the extension when absent.
    #[arg(short, long)]
    format: Option<String>,

    /// The task to be performed: count, dedup or stats.
    #[arg(short, long, default_value_t = String::from("count"))]
    task: String,

    /// YAML run configuration; flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Worker threads, 0 for hardware concurrency.
    #[arg(short, long)]
    num_threads: Option<usize>,

    /// Counting kernel: bitmap, packed_bitmap, radix_hash, merge, packed_merge or edge_bitmap.
    #[arg(short, long)]
    strategy: Option<String>,

    /// Adjacency layout: symmetric or dodg.
    #[arg(short, long)]
    orientation: Option<String>,

    /// Skip degree-descending relabeling.
    #[arg(long, default_value_t = false)]
    no_reorder: bool,

    /// Exclusive bound of word-packed vertex ids.
    #[arg(short, long)]
    pack_threshold: Option<u32>,

    /// Output file of the dedup task.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn build_config(args: &Args) -> anyhow::Result<RunConfig> {
    let mut config = match &args.config {
        Some(path) => RunConfig::from_yaml_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => RunConfig::default(),
    };
    if let Some(thread_num) = args.num_threads {
        config.thread_num = thread_num;
    }
    if let Some(strategy) = &args.strategy {
        config.strategy = strategy.parse::<KernelStrategy>()?;
    }
    if let Some(orientation) = &args.orientation {
        config.orientation = match orientation.as_str() {
            "symmetric" => Orientation::Symmetric,
            "dodg" => Orientation::DegreeOriented,
            other => bail!("unknown orientation `{other}`"),
        };
    }
    if args.no_reorder {
        config.reorder = false;
    }
    if let Some(pack_threshold) = args.pack_threshold {
        config.pack_threshold = pack_threshold;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = Args::parse();
    let config = build_config(&args)?;
    info!("arguments: {}", serde_yaml::to_string(&args)?.trim_end().replace('\n', ", "));

    // Step 1. Load the raw edge list.
    let format = match args.format.as_deref() {
        None => EdgeListFormat::from_path(&args.input),
        Some("bin") | Some("binary") => EdgeListFormat::Binary,
        Some("txt") | Some("text") => EdgeListFormat::Text,
        Some(other) => bail!("unknown input format `{other}`"),
    };
    let edges = load_edge_list(&args.input, format)
        .with_context(|| format!("loading {}", args.input.display()))?;

    // Step 2. Perform the task.
    match args.task.as_str() {
        "count" => {
            let report = TriangleController::new(config).run(edges)?;
            println!("There are {} triangles in the input graph.", report.triangle_count);
        }
        "dedup" => {
            let Some(output) = &args.output else {
                bail!("the dedup task needs --output");
            };
            let mut phases = PhaseCollector::new();
            let dedup = measure_phase!(phases, "dedup", { dedup_edges(edges) });
            write_binary_edge_list(output, &dedup.edges)
                .with_context(|| format!("writing {}", output.display()))?;
            println!(
                "Wrote {} edges over {} vertices to {}.",
                format_with_commas(dedup.edges.len() as u64),
                format_with_commas(dedup.vertex_count() as u64),
                output.display()
            );
        }
        "stats" => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.effective_threads())
                .build()?;
            let (vertex_count, edge_count, max_degree) = pool.install(|| {
                let dedup = dedup_edges(edges);
                let graph = build_csr(&dedup.edges, dedup.vertex_count());
                (graph.vertex_count, graph.undirected_edge_count(), graph.max_degree())
            });
            println!(
                "Vertex Count: {}, Edge Count: {}, Max Degree: {}",
                format_with_commas(vertex_count as u64),
                format_with_commas(edge_count as u64),
                format_with_commas(max_degree as u64)
            );
        }
        other => bail!("Task {other} not supported in tricount."),
    }
    Ok(())
}
