//! Device resource management for BFS
//!
//! Uploads graph topology and traversal state to device-resident storage
//! buffers and reads results back through transient staging buffers. Kernels
//! never write into a mappable buffer: every download copies into a fresh
//! `MAP_READ` staging buffer that is dropped once the data is on the host.

use super::GpuDevice;
use crate::error::{BenchError, Result};
use crate::partition::HardwareLimits;
use crate::storage::{BfsGraph, TraversalState};

/// Uniform parameter block shared by both BFS kernels
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct BfsParams {
    pub(crate) num_nodes: u32,
    pub(crate) num_edges: u32,
    pub(crate) _padding: [u32; 2],
}

const U32_BYTES: u64 = std::mem::size_of::<u32>() as u64;

/// Byte size of a `u32` payload of `len` elements
fn payload_bytes(len: usize) -> u64 {
    len as u64 * U32_BYTES
}

/// Storage bindings cannot be empty; zero-length payloads become one element
fn non_empty(data: &[u32]) -> &[u32] {
    if data.is_empty() {
        &[0]
    } else {
        data
    }
}

/// Device buffers for one BFS run
///
/// Owns every device-resident array of the run. Drop it to release them.
#[derive(Debug)]
pub struct BfsDeviceBuffers {
    num_nodes: usize,
    num_edges: usize,

    pub(crate) params: wgpu::Buffer,
    pub(crate) edge_start: wgpu::Buffer,
    pub(crate) edge_degree: wgpu::Buffer,
    pub(crate) edges: wgpu::Buffer,
    pub(crate) frontier: wgpu::Buffer,
    pub(crate) pending: wgpu::Buffer,
    pub(crate) visited: wgpu::Buffer,
    pub(crate) distance: wgpu::Buffer,
    pub(crate) continue_flag: wgpu::Buffer,
}

impl BfsDeviceBuffers {
    /// Validate sizes against `limits`, then allocate and upload everything
    ///
    /// No buffer is created unless every buffer fits.
    ///
    /// # Errors
    ///
    /// - `MalformedInput` if `state` does not match the graph's node count
    /// - `CapabilityExceeded` if any buffer exceeds `max_single_buffer_size`
    /// - `AllocationFailure` if the device rejects an allocation
    pub async fn upload(
        device: &GpuDevice,
        graph: &BfsGraph,
        state: &TraversalState,
        limits: &HardwareLimits,
    ) -> Result<Self> {
        let num_nodes = graph.num_nodes();
        let num_edges = graph.num_edges();

        if state.num_nodes() != num_nodes {
            return Err(BenchError::malformed(format!(
                "traversal state covers {} nodes, graph has {num_nodes}",
                state.num_nodes()
            )));
        }

        let params = BfsParams {
            num_nodes: u32::try_from(num_nodes)
                .map_err(|_| BenchError::malformed("node count does not fit in u32"))?,
            num_edges: u32::try_from(num_edges)
                .map_err(|_| BenchError::malformed("edge count does not fit in u32"))?,
            _padding: [0; 2],
        };

        Self::check_capacity(graph, limits)?;

        let wgpu_device = device.device();
        wgpu_device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        wgpu_device.push_error_scope(wgpu::ErrorFilter::Validation);

        let storage = wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST;
        let upload = |label: &str, data: &[u32], usage: wgpu::BufferUsages| {
            log::debug!("Uploading {label}: {} bytes", payload_bytes(data.len()));
            device.create_buffer_init(label, bytemuck::cast_slice(non_empty(data)), usage)
        };

        let buffers = Self {
            num_nodes,
            num_edges,
            params: device.create_buffer_init(
                "BFS Params",
                bytemuck::bytes_of(&params),
                wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            ),
            edge_start: upload("BFS edge_start", graph.edge_start(), storage),
            edge_degree: upload("BFS edge_degree", graph.edge_degree(), storage),
            edges: upload("BFS edges", graph.edges(), storage),
            frontier: upload("BFS frontier", &state.frontier, storage),
            pending: upload("BFS pending", &state.pending, storage),
            visited: upload("BFS visited", &state.visited, storage),
            distance: upload(
                "BFS distance",
                &state.distance,
                storage | wgpu::BufferUsages::COPY_SRC,
            ),
            continue_flag: upload(
                "BFS continue flag",
                &[0],
                storage | wgpu::BufferUsages::COPY_SRC,
            ),
        };

        let validation = wgpu_device.pop_error_scope().await;
        let out_of_memory = wgpu_device.pop_error_scope().await;
        if let Some(err) = out_of_memory.or(validation) {
            return Err(BenchError::AllocationFailure {
                label: "BFS device buffers".to_string(),
                reason: err.to_string(),
            });
        }

        Ok(buffers)
    }

    /// Check every buffer of `graph` against `max_single_buffer_size`
    ///
    /// Touches no device state.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityExceeded` for the first buffer that does not fit
    pub fn check_capacity(graph: &BfsGraph, limits: &HardwareLimits) -> Result<()> {
        // Per-node arrays share one size; the edge array is the only other
        limits.check_buffer("per-node state buffer", payload_bytes(graph.num_nodes()))?;
        limits.check_buffer("edge buffer", payload_bytes(graph.num_edges()))
    }

    /// Number of nodes
    #[must_use]
    pub const fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of edges
    #[must_use]
    pub const fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Clear the continue flag before a round
    ///
    /// The write is ordered before any command buffer submitted afterwards.
    pub fn reset_continue_flag(&self, device: &GpuDevice) {
        device
            .queue()
            .write_buffer(&self.continue_flag, 0, bytemuck::bytes_of(&0u32));
    }

    /// Read the continue flag back to the host
    ///
    /// Waits for all previously submitted work, so this is the round's
    /// synchronisation point.
    ///
    /// # Errors
    ///
    /// Returns `Readback` if the staging buffer cannot be mapped
    pub async fn download_continue_flag(&self, device: &GpuDevice) -> Result<bool> {
        let flag: Vec<u32> =
            read_buffer(device, &self.continue_flag, 1, "Continue Flag Staging").await?;
        Ok(flag.first().is_some_and(|&f| f != 0))
    }

    /// Read the distance array back to the host
    ///
    /// # Errors
    ///
    /// Returns `Readback` if the staging buffer cannot be mapped
    pub async fn download_distances(&self, device: &GpuDevice) -> Result<Vec<u32>> {
        read_buffer(device, &self.distance, self.num_nodes, "Distances Staging").await
    }
}

/// Copy `count` elements of `source` into a transient staging buffer and map it
///
/// # Errors
///
/// Returns `Readback` if the map request fails or its callback is dropped
pub(crate) async fn read_buffer<T: bytemuck::Pod>(
    device: &GpuDevice,
    source: &wgpu::Buffer,
    count: usize,
    label: &str,
) -> Result<Vec<T>> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let size = (count * std::mem::size_of::<T>()) as u64;
    let staging_buffer = device.create_buffer(
        label,
        size,
        wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
    );

    let mut encoder = device
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
    encoder.copy_buffer_to_buffer(source, 0, &staging_buffer, 0, size);
    device.queue().submit(Some(encoder.finish()));

    let buffer_slice = staging_buffer.slice(..);
    let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();

    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });

    device.device().poll(wgpu::Maintain::Wait);
    rx.receive()
        .await
        .ok_or_else(|| BenchError::Readback(format!("{label}: map callback dropped")))?
        .map_err(|e| BenchError::Readback(format!("{label}: {e}")))?;

    let data = buffer_slice.get_mapped_range();
    let values: Vec<T> = bytemuck::cast_slice(&data).to_vec();
    drop(data);
    staging_buffer.unmap();

    Ok(values)
}
