//! GPU execution of the benchmarks
//!
//! # Architecture
//!
//! - `device`: adapter/device acquisition and hardware limits
//! - `buffer`: device resource management (upload, staging readback)
//! - `kernels`: WGSL frontier-expansion and frontier-commit pipelines
//! - `bfs`: convergence controller driving rounds to quiescence
//! - `vector_add`: single-dispatch vector addition
//!
//! # Feature Flag
//!
//! This module is only available with the `gpu` feature flag:
//! ```bash
//! cargo build --features gpu
//! ```

mod bfs;
mod buffer;
mod device;
mod kernels;
mod vector_add;

pub use bfs::{gpu_bfs, GpuBfsResult};
pub use buffer::BfsDeviceBuffers;
pub use device::{hardware_limits_from, GpuDevice, GpuDeviceError};
pub use kernels::BfsKernels;
pub use vector_add::{gpu_vector_add, vector_add_inputs, VectorAddOutcome};
