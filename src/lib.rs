//! hybris: GPU compute benchmark harness
//!
//! # Overview
//!
//! hybris runs level-synchronous breadth-first search over CSR graphs on a
//! GPU and checks the resulting hop distances against a reference. It also
//! carries a single-dispatch vector-addition benchmark for smoke-testing a
//! device.
//!
//! # Quick Start
//!
//! ```
//! use hybris::{level_synchronous_bfs, reference_bfs, BfsGraph, NodeId};
//!
//! # fn main() -> Result<(), hybris::BenchError> {
//! // 0 → {1, 2}, 1 → 3
//! let graph = BfsGraph::from_parts(vec![0, 2, 3, 3], vec![2, 1, 0, 0], vec![1, 2, 3])?;
//!
//! let result = level_synchronous_bfs(&graph, NodeId(0))?;
//! assert_eq!(result.distances, vec![0, 1, 1, 2]);
//! assert_eq!(result.rounds, 3);
//!
//! assert_eq!(reference_bfs(&graph, NodeId(0))?, result.distances);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Storage**: CSR graph, text graph/reference formats, traversal state
//! - **Partition**: one lane per node, blocks sized to hardware limits
//! - **Algorithms**: queue-based oracle, CPU level-synchronous backend, verifier
//! - **GPU**: wgpu buffers, WGSL expansion/commit kernels, convergence loop

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod algorithms;
pub mod config;
pub mod error;
pub mod partition;
pub mod storage;

// GPU execution (optional)
#[cfg(feature = "gpu")]
pub mod gpu;
#[cfg(feature = "gpu")]
pub mod runner;

// Re-export core types
pub use algorithms::{
    eccentricity, find_mismatches, level_synchronous_bfs, reference_bfs, verify_distances,
    LevelSyncResult, Mismatch,
};
pub use config::{BfsConfig, HarnessConfig, VectorAddConfig};
pub use error::{BenchError, Result};
pub use partition::{HardwareLimits, PartitionPlan};
pub use storage::{BfsGraph, NodeId, TraversalState, UNREACHED};

#[cfg(feature = "gpu")]
pub use gpu::{gpu_bfs, gpu_vector_add, GpuBfsResult, GpuDevice, VectorAddOutcome};
#[cfg(feature = "gpu")]
pub use runner::{
    open_device, run_benchmark, run_bfs, Benchmark, BenchmarkOutcome, BenchmarkReport, GraphRef,
};
