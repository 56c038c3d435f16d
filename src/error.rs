//! Benchmark error taxonomy
//!
//! Every failure a run can hit is surfaced to the caller as one of these
//! variants. Nothing here is retried: given the same input and hardware the
//! outcome is deterministic.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading inputs, driving the device, or verifying results
#[derive(Debug, Error)]
pub enum BenchError {
    /// Graph or reference file is unparseable or truncated
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Workload does not fit the accelerator's advertised limits
    ///
    /// Raised before any allocation is attempted.
    #[error("{resource} requires {requested}, exceeding the hardware limit of {limit}")]
    CapabilityExceeded {
        /// Which limit was hit (e.g. "blocks per dispatch")
        resource: &'static str,
        /// Amount the workload needs
        requested: u64,
        /// Amount the hardware allows
        limit: u64,
    },

    /// The device rejected a buffer allocation
    #[error("Device allocation failed for {label}: {reason}")]
    AllocationFailure {
        /// Buffer group being allocated
        label: String,
        /// Error reported by the device
        reason: String,
    },

    /// Computed distances diverge from the reference
    #[error("Result mismatch at node {node}: expected {expected}, got {actual}")]
    ResultMismatch {
        /// First diverging node index
        node: usize,
        /// Reference distance
        expected: u32,
        /// Computed distance
        actual: u32,
    },

    /// Convergence loop exceeded its round bound
    #[error("BFS did not converge within {rounds} rounds")]
    NonConvergence {
        /// Rounds executed before giving up
        rounds: u32,
    },

    /// Copying or mapping a device buffer back to the host failed
    #[error("Device readback failed: {0}")]
    Readback(String),

    /// Input file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Adapter or device acquisition failed
    #[cfg(feature = "gpu")]
    #[error(transparent)]
    Device(#[from] crate::gpu::GpuDeviceError),

    /// Benchmark name is not recognised
    #[error("Unknown benchmark: {0}")]
    UnknownBenchmark(String),

    /// Benchmark is known but has no implementation
    #[error("Benchmark {0} is not yet implemented")]
    NotImplemented(String),
}

impl BenchError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput(reason.into())
    }

    /// True for a correctness failure of a completed run (as opposed to a crash)
    #[must_use]
    pub const fn is_result_mismatch(&self) -> bool {
        matches!(self, Self::ResultMismatch { .. })
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = BenchError> = std::result::Result<T, E>;
