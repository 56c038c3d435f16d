//! Benchmark selection and the BFS benchmark entry point

use crate::algorithms::{reference_bfs, verify_distances, Mismatch};
use crate::config::{BfsConfig, HarnessConfig};
use crate::error::{BenchError, Result};
use crate::partition::HardwareLimits;
use crate::gpu::{gpu_bfs, gpu_vector_add, GpuDevice, VectorAddOutcome};
use crate::storage::{load_graph, load_reference, BfsGraph, NodeId};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Benchmarks the harness can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Benchmark {
    /// Single-dispatch vector addition
    VectorAdd,
    /// Level-synchronous breadth-first search
    Bfs,
}

impl FromStr for Benchmark {
    type Err = BenchError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "vector-add" => Ok(Self::VectorAdd),
            "bfs" => Ok(Self::Bfs),
            "gaussian" | "particlefilter" => Err(BenchError::NotImplemented(name.to_string())),
            other => Err(BenchError::UnknownBenchmark(other.to_string())),
        }
    }
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::VectorAdd => "vector-add",
            Self::Bfs => "bfs",
        })
    }
}

/// Input files for a BFS run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphRef {
    /// Graph description
    pub graph: PathBuf,

    /// Reference distances; the in-crate oracle is used when absent
    pub reference: Option<PathBuf>,
}

impl GraphRef {
    /// Graph without a reference file
    #[must_use]
    pub fn new(graph: impl Into<PathBuf>) -> Self {
        Self {
            graph: graph.into(),
            reference: None,
        }
    }

    /// Attach a reference-result file
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<PathBuf>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// Outcome of one BFS benchmark run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkOutcome {
    /// Convergence rounds executed
    pub total_rounds: u32,

    /// Wall time from upload through distance readback
    pub elapsed: Duration,

    /// Distances were checked and matched the reference
    pub verified: bool,

    /// First divergence, when verification failed
    pub mismatch: Option<Mismatch>,

    /// Computed distances
    pub distances: Vec<u32>,
}

/// Result of [`run_benchmark`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BenchmarkReport {
    /// Vector-add outcome
    VectorAdd(VectorAddOutcome),
    /// BFS outcome
    Bfs(BenchmarkOutcome),
}

/// Acquire a device for benchmarking on any backend
///
/// # Errors
///
/// Returns `Device` if no adapter is found or the device request fails
pub async fn open_device() -> Result<GpuDevice> {
    open_device_with_backend(wgpu::Backends::all()).await
}

/// Acquire a device restricted to `backends`
///
/// # Errors
///
/// Returns `Device` if no adapter is found or the device request fails
pub async fn open_device_with_backend(backends: wgpu::Backends) -> Result<GpuDevice> {
    let device = GpuDevice::new_with_backend(backends).await?;
    let info = device.info();
    log::info!(
        "Device ready: {} (vendor {:#06x}, device {:#06x}, driver {} {})",
        info.name,
        info.vendor,
        info.device,
        info.driver,
        info.driver_info
    );
    Ok(device)
}

/// Adapter identity and benchmark limits, one `label: value` line each
#[must_use]
pub fn describe_device(info: &wgpu::AdapterInfo, limits: &HardwareLimits) -> String {
    [
        format!("adapter:                 {} ({:?})", info.name, info.backend),
        format!("device type:             {:?}", info.device_type),
        format!("vendor id:               {:#06x}", info.vendor),
        format!("device id:               {:#06x}", info.device),
        format!("driver:                  {} {}", info.driver, info.driver_info),
        format!("max threads per block:   {}", limits.max_threads_per_block),
        format!("max blocks per dispatch: {}", limits.max_blocks_per_dispatch),
        format!("max single buffer size:  {}", limits.max_single_buffer_size),
    ]
    .join("\n")
}

/// Run BFS on an in-memory graph and verify against `reference`
///
/// With `config.verify` set and no `reference`, the queue-based oracle
/// provides the expected distances. A verification failure is reported in the
/// outcome (`verified == false`), not as an error.
///
/// # Errors
///
/// Any error from [`gpu_bfs`], or `MalformedInput` if the reference length
/// differs from the node count.
pub async fn run_bfs_on_graph(
    device: &GpuDevice,
    graph: &BfsGraph,
    reference: Option<Vec<u32>>,
    config: &BfsConfig,
) -> Result<BenchmarkOutcome> {
    let source = NodeId(config.source);
    graph.check_node(source)?;
    let limits = device
        .hardware_limits()
        .with_thread_cap(config.max_threads_per_block);

    log::info!(
        "Running BFS: {} nodes, {} edges, source {}",
        graph.num_nodes(),
        graph.num_edges(),
        source.0
    );
    let start = Instant::now();
    let result = gpu_bfs(device, graph, source, &limits).await?;
    let elapsed = start.elapsed();
    log::info!("BFS converged in {} rounds ({elapsed:?})", result.rounds);

    let mut verified = false;
    let mut mismatch = None;
    if config.verify {
        let expected = match reference {
            Some(reference) => reference,
            None => reference_bfs(graph, source)?,
        };
        match verify_distances(&result.distances, &expected) {
            Ok(()) => verified = true,
            Err(BenchError::ResultMismatch {
                node,
                expected,
                actual,
            }) => {
                log::warn!("BFS result mismatch at node {node}: expected {expected}, got {actual}");
                mismatch = Some(Mismatch {
                    node,
                    expected,
                    actual,
                });
            }
            Err(err) => return Err(err),
        }
    }

    Ok(BenchmarkOutcome {
        total_rounds: result.rounds,
        elapsed,
        verified,
        mismatch,
        distances: result.distances,
    })
}

/// Load the graph (and reference) named by `graph_ref` and run BFS
///
/// Input files are fully parsed before any device work starts.
///
/// # Errors
///
/// `Io` / `MalformedInput` for unreadable or malformed inputs, otherwise as
/// [`run_bfs_on_graph`].
pub async fn run_bfs(
    device: &GpuDevice,
    graph_ref: &GraphRef,
    config: &BfsConfig,
) -> Result<BenchmarkOutcome> {
    log::info!("Loading graph {}", graph_ref.graph.display());
    let file = load_graph(&graph_ref.graph).await?;

    let reference = match &graph_ref.reference {
        Some(path) if config.verify => Some(load_reference(path).await?),
        _ => None,
    };

    run_bfs_on_graph(device, &file.graph, reference, config).await
}

/// Run a benchmark by selection
///
/// # Errors
///
/// `MalformedInput` if BFS is selected without a graph, otherwise the
/// benchmark's own errors.
pub async fn run_benchmark(
    device: &GpuDevice,
    benchmark: Benchmark,
    config: &HarnessConfig,
    graph_ref: Option<&GraphRef>,
) -> Result<BenchmarkReport> {
    log::info!("Running {benchmark}...");
    let report = match benchmark {
        Benchmark::VectorAdd => {
            let outcome =
                gpu_vector_add(device, &config.vector_add, &device.hardware_limits()).await?;
            BenchmarkReport::VectorAdd(outcome)
        }
        Benchmark::Bfs => {
            let graph_ref = graph_ref
                .ok_or_else(|| BenchError::malformed("the bfs benchmark requires a graph file"))?;
            BenchmarkReport::Bfs(run_bfs(device, graph_ref, &config.bfs).await?)
        }
    };
    log::info!("Finished {benchmark}.");
    Ok(report)
}
