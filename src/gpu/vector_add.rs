//! GPU vector addition
//!
//! Single dispatch, no iteration: `c[i] = a[i] + b[i]` with
//! `b[i] = max_value - a[i]`, so every `c[i]` must equal `max_value`.

use super::buffer::read_buffer;
use super::kernels::{compute_pipeline, shader_source, storage_entry, uniform_entry};
use super::GpuDevice;
use crate::config::VectorAddConfig;
use crate::error::{BenchError, Result};
use crate::partition::{HardwareLimits, PartitionPlan};
use std::time::{Duration, Instant};

const VECTOR_ADD_SHADER: &str = include_str!("shaders/vector_add.wgsl");

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct VectorAddParams {
    len: u32,
    _padding: [u32; 3],
}

/// Vector-add benchmark outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorAddOutcome {
    /// Elements added
    pub len: u32,

    /// Elements whose sum differs from `max_value`
    pub mismatches: usize,

    /// Upload, dispatch and readback time
    pub elapsed: Duration,
}

impl VectorAddOutcome {
    /// True if every element checked out
    #[must_use]
    pub const fn is_correct(&self) -> bool {
        self.mismatches == 0
    }
}

/// Deterministic inputs: `a[i]` in `[0, max_value)`, `b[i] = max_value - a[i]`
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn vector_add_inputs(len: u32, max_value: u32, seed: u64) -> (Vec<u32>, Vec<u32>) {
    let mut rng_state = seed;
    let a: Vec<u32> = (0..len)
        .map(|_| {
            rng_state = rng_state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let sample = (rng_state >> 33) as u32;
            if max_value == 0 {
                0
            } else {
                sample % max_value
            }
        })
        .collect();
    let b = a.iter().map(|&x| max_value - x).collect();
    (a, b)
}

/// Run vector addition on the GPU and check every element
///
/// # Errors
///
/// - `MalformedInput` if `len` is zero
/// - `CapabilityExceeded` if the block count or buffer size exceeds `limits`
/// - `AllocationFailure` if the device rejects an allocation
/// - `Readback` if the result cannot be mapped
pub async fn gpu_vector_add(
    device: &GpuDevice,
    config: &VectorAddConfig,
    limits: &HardwareLimits,
) -> Result<VectorAddOutcome> {
    let len = config.len;
    let plan = PartitionPlan::for_items(len, limits)?;
    let buffer_size = u64::from(len) * std::mem::size_of::<u32>() as u64;
    limits.check_buffer("vector buffer", buffer_size)?;

    let (a, b) = vector_add_inputs(len, config.max_value, 0x5eed);
    let start = Instant::now();

    let wgpu_device = device.device();
    wgpu_device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

    let storage = wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST;
    let params = device.create_buffer_init(
        "Vector Add Params",
        bytemuck::bytes_of(&VectorAddParams {
            len,
            _padding: [0; 3],
        }),
        wgpu::BufferUsages::UNIFORM,
    );
    let buffer_a = device.create_buffer_init("Vector A", bytemuck::cast_slice(&a), storage);
    let buffer_b = device.create_buffer_init("Vector B", bytemuck::cast_slice(&b), storage);
    let buffer_c = device.create_buffer(
        "Vector C",
        buffer_size,
        wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
    );

    if let Some(err) = wgpu_device.pop_error_scope().await {
        return Err(BenchError::AllocationFailure {
            label: "vector-add buffers".to_string(),
            reason: err.to_string(),
        });
    }

    let shader_module = wgpu_device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Vector Add Shader"),
        source: wgpu::ShaderSource::Wgsl(
            shader_source(VECTOR_ADD_SHADER, plan.threads_per_block).into(),
        ),
    });
    let bind_group_layout = wgpu_device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Vector Add Bind Group Layout"),
        entries: &[
            uniform_entry(0),
            storage_entry(1, true),
            storage_entry(2, true),
            storage_entry(3, false),
        ],
    });
    let pipeline_layout = wgpu_device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Vector Add Pipeline Layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });
    let pipeline = compute_pipeline(
        device,
        "Vector Add Pipeline",
        &pipeline_layout,
        &shader_module,
        "vector_add",
    );

    let bind_group = wgpu_device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Vector Add Bind Group"),
        layout: &bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: params.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: buffer_a.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: buffer_b.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: buffer_c.as_entire_binding(),
            },
        ],
    });

    let mut encoder = wgpu_device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Vector Add Encoder"),
    });
    {
        let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Vector Add Pass"),
            timestamp_writes: None,
        });
        compute_pass.set_pipeline(&pipeline);
        compute_pass.set_bind_group(0, &bind_group, &[]);
        compute_pass.dispatch_workgroups(plan.block_count, 1, 1);
    }
    device.queue().submit(Some(encoder.finish()));

    let c: Vec<u32> = read_buffer(device, &buffer_c, len as usize, "Vector C Staging").await?;
    let elapsed = start.elapsed();

    let mismatches = c.iter().filter(|&&sum| sum != config.max_value).count();
    if mismatches == 0 {
        log::info!("{len} results checked, correct");
    } else {
        log::warn!("{len} results checked, {mismatches} incorrect");
    }

    Ok(VectorAddOutcome {
        len,
        mismatches,
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_inputs_sum_to_max_value() {
        let (a, b) = vector_add_inputs(1000, 1024, 42);
        assert_eq!(a.len(), 1000);
        assert!(a.iter().all(|&x| x < 1024));
        assert!(a.iter().zip(&b).all(|(&x, &y)| x + y == 1024));
    }

    #[test]
    fn test_inputs_are_deterministic() {
        assert_eq!(vector_add_inputs(64, 100, 7), vector_add_inputs(64, 100, 7));
    }

    #[test]
    fn test_zero_max_value() {
        let (a, b) = vector_add_inputs(4, 0, 1);
        assert_eq!(a, vec![0; 4]);
        assert_eq!(b, vec![0; 4]);
    }

    #[tokio::test]
    #[serial]
    async fn test_gpu_vector_add() {
        if !GpuDevice::is_gpu_available().await {
            eprintln!("⚠️  Skipping test_gpu_vector_add: GPU not available");
            return;
        }

        let device = GpuDevice::new().await.unwrap();
        let config = VectorAddConfig {
            len: 10_000,
            max_value: 1024,
        };
        let outcome = gpu_vector_add(&device, &config, &device.hardware_limits())
            .await
            .unwrap();

        assert_eq!(outcome.len, 10_000);
        assert!(outcome.is_correct());
    }

    #[tokio::test]
    #[serial]
    async fn test_gpu_vector_add_too_many_blocks() {
        if !GpuDevice::is_gpu_available().await {
            eprintln!("⚠️  Skipping test_gpu_vector_add_too_many_blocks: GPU not available");
            return;
        }

        let device = GpuDevice::new().await.unwrap();
        let limits = HardwareLimits {
            max_threads_per_block: 16,
            max_blocks_per_dispatch: 4,
            ..device.hardware_limits()
        };
        let config = VectorAddConfig {
            len: 100,
            max_value: 8,
        };
        let err = gpu_vector_add(&device, &config, &limits).await.unwrap_err();
        assert!(matches!(err, BenchError::CapabilityExceeded { .. }));
    }
}
