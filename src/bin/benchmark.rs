//! Benchmark suite: generate graphs from a CSV configuration, run both
//! partitioners against each, and append one result row per run.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use sbp::bench::config::{load_sources, GeneratorMode};
use sbp::bench::{run_single, Algorithm, ExecutionMode, ResultWriter};

const CONFIG_PATH: &str = "scripts/graph_config.csv";
const RESULTS_PATH: &str = "results/benchmark_results.csv";
const RUNS_PER_GRAPH: usize = 5;
const PROPOSALS_PER_SPLIT: usize = 50;

/// MDL stochastic block partitioning benchmark suite.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Graph generator family.
    #[arg(value_enum, default_value = "standard")]
    generator: GeneratorMode,

    /// Thread configuration; `sequential` pins the pool to one worker.
    #[arg(value_enum, default_value = "parallel")]
    mode: ExecutionMode,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if cli.mode == ExecutionMode::Sequential {
        if let Err(err) = rayon::ThreadPoolBuilder::new().num_threads(1).build_global() {
            error!("could not pin the thread pool: {err}");
            return ExitCode::FAILURE;
        }
    }

    match run_suite(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run_suite(cli: &Cli) -> sbp::Result<()> {
    let sources = load_sources(Path::new(CONFIG_PATH), cli.generator)?;
    let mut writer = ResultWriter::create(Path::new(RESULTS_PATH))?;
    info!(
        "benchmarking {} graph configurations, {} runs each ({} mode)",
        sources.len(),
        RUNS_PER_GRAPH,
        cli.mode.label()
    );

    for (graph_id, source) in sources.iter().enumerate() {
        for run in 0..RUNS_PER_GRAPH {
            let seed = (graph_id * 1000 + run) as u64;
            let (graph, truth) = source.generate(seed)?;
            let target = truth.iter().copied().max().map_or(1, |top| top + 1);
            info!(
                "graph {graph_id} run {run}: N={}, M={}, K*={target}",
                graph.vertex_count(),
                graph.edge_count()
            );

            for algorithm in [Algorithm::TopDown, Algorithm::BottomUp] {
                let record = run_single(
                    &graph,
                    &truth,
                    graph_id,
                    target,
                    algorithm,
                    cli.mode,
                    run,
                    PROPOSALS_PER_SPLIT,
                    seed,
                )?;
                info!(
                    "  {}: {:.3}s, K={}, NMI={:.3}, H={:.2}",
                    algorithm.label(),
                    record.runtime_sec,
                    record.clusters_found,
                    record.nmi,
                    record.mdl_raw
                );
                writer.append(&record)?;
            }
        }
    }

    info!("benchmark complete; results in {RESULTS_PATH}");
    Ok(())
}
