use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hybris::runner::{
    describe_device, open_device, run_benchmark, run_bfs, Benchmark, BenchmarkOutcome,
    BenchmarkReport, GraphRef,
};
use hybris::storage::write_reference;
use hybris::{gpu_vector_add, HarnessConfig, VectorAddOutcome};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Subcommand, Debug)]
enum Commands {
    /// print adapter and hardware limits
    Info,
    /// run BFS over a graph file
    Bfs(BfsArgs),
    /// run vector addition
    VectorAdd(VectorAddArgs),
    /// run a benchmark by name
    Run(RunArgs),
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Command
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(clap::Args, Debug)]
struct GraphArgs {
    /// graph file in the node/edge text format
    #[arg(short = 'g', long = "graph")]
    graph: PathBuf,

    /// reference result file; the CPU oracle is used when omitted
    #[arg(short = 'r', long = "reference")]
    reference: Option<PathBuf>,
}

impl GraphArgs {
    fn graph_ref(&self) -> GraphRef {
        GraphRef {
            graph: self.graph.clone(),
            reference: self.reference.clone(),
        }
    }
}

#[derive(clap::Args, Debug)]
struct BfsArgs {
    #[command(flatten)]
    input: GraphArgs,

    /// source node index
    #[arg(short = 's', long = "source")]
    source: Option<u32>,

    /// cap on threads per block
    #[arg(short = 't', long = "max-threads")]
    max_threads: Option<u32>,

    /// write computed distances in the reference-result format
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct VectorAddArgs {
    /// number of elements
    #[arg(short = 'n', long = "len")]
    len: Option<u32>,

    /// expected value of every sum
    #[arg(short = 'm', long = "max-value")]
    max_value: Option<u32>,
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// vector-add, bfs, gaussian or particlefilter
    name: String,

    /// graph file, required by bfs
    #[arg(short = 'g', long = "graph")]
    graph: Option<PathBuf>,

    /// reference result file
    #[arg(short = 'r', long = "reference")]
    reference: Option<PathBuf>,
}

fn report_bfs(outcome: &BenchmarkOutcome) -> bool {
    println!("rounds:   {}", outcome.total_rounds);
    println!("elapsed:  {:?}", outcome.elapsed);
    println!("verified: {}", outcome.verified);
    if let Some(mismatch) = &outcome.mismatch {
        println!(
            "first mismatch at node {}: expected {}, got {}",
            mismatch.node, mismatch.expected, mismatch.actual
        );
    }
    outcome.mismatch.is_none()
}

fn report_vector_add(outcome: &VectorAddOutcome) -> bool {
    println!("len:        {}", outcome.len);
    println!("elapsed:    {:?}", outcome.elapsed);
    println!("mismatches: {}", outcome.mismatches);
    outcome.is_correct()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => HarnessConfig::from_json_file(path)
            .await
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => HarnessConfig::default(),
    };

    // Reject unknown and unimplemented names before touching the device
    let benchmark = match &args.cmd {
        Commands::Run(run) => Some(run.name.parse::<Benchmark>()?),
        _ => None,
    };

    let device = open_device().await.context("acquiring a GPU device")?;

    let passed = match args.cmd {
        Commands::Info => {
            println!(
                "{}",
                describe_device(&device.info(), &device.hardware_limits())
            );
            true
        }
        Commands::Bfs(bfs) => {
            if let Some(source) = bfs.source {
                config.bfs.source = source;
            }
            if let Some(max_threads) = bfs.max_threads {
                config.bfs.max_threads_per_block = max_threads;
            }
            let outcome = run_bfs(&device, &bfs.input.graph_ref(), &config.bfs)
                .await
                .with_context(|| format!("running BFS on {}", bfs.input.graph.display()))?;
            if let Some(path) = &bfs.output {
                tokio::fs::write(path, write_reference(&outcome.distances))
                    .await
                    .with_context(|| format!("writing {}", path.display()))?;
            }
            report_bfs(&outcome)
        }
        Commands::VectorAdd(vector_add) => {
            if let Some(len) = vector_add.len {
                config.vector_add.len = len;
            }
            if let Some(max_value) = vector_add.max_value {
                config.vector_add.max_value = max_value;
            }
            let outcome =
                gpu_vector_add(&device, &config.vector_add, &device.hardware_limits()).await?;
            report_vector_add(&outcome)
        }
        Commands::Run(run) => {
            let graph_ref = run.graph.map(|graph| GraphRef {
                graph,
                reference: run.reference,
            });
            let benchmark = benchmark.context("benchmark selection")?;
            match run_benchmark(&device, benchmark, &config, graph_ref.as_ref()).await? {
                BenchmarkReport::VectorAdd(outcome) => report_vector_add(&outcome),
                BenchmarkReport::Bfs(outcome) => report_bfs(&outcome),
            }
        }
    };

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
