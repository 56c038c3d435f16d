//! GPU device initialization and capability queries
//!
//! Handles wgpu adapter selection, device creation, and translation of wgpu
//! limits into the benchmark's [`HardwareLimits`].

use crate::partition::HardwareLimits;
use thiserror::Error;
use wgpu::util::DeviceExt;

/// GPU device initialization errors
#[derive(Debug, Error)]
pub enum GpuDeviceError {
    /// No compatible GPU adapter found
    #[error("No compatible GPU adapter found")]
    NoAdapter,

    /// Failed to request GPU device
    #[error("Failed to request GPU device: {0}")]
    DeviceRequest(String),
}

/// GPU device wrapper for benchmark workloads
///
/// # Example
///
/// ```ignore
/// # use hybris::gpu::GpuDevice;
/// let device = GpuDevice::new().await?;
/// println!("{}", device.info().name);
/// ```
#[derive(Debug)]
pub struct GpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter: wgpu::Adapter,
}

impl GpuDevice {
    /// Check if GPU is available without keeping a device
    ///
    /// This is useful for tests to skip gracefully when GPU is not available.
    pub async fn is_gpu_available() -> bool {
        Self::new().await.is_ok()
    }

    /// Initialize GPU device on any backend
    ///
    /// # Errors
    ///
    /// Returns `GpuDeviceError` if no adapter is found or the device request
    /// fails
    pub async fn new() -> Result<Self, GpuDeviceError> {
        Self::new_with_backend(wgpu::Backends::all()).await
    }

    /// Initialize GPU device with specific backend
    ///
    /// The device is requested with the adapter's own limits so the
    /// benchmarks can use the largest workgroups the hardware supports.
    ///
    /// # Errors
    ///
    /// Returns `GpuDeviceError` if device initialization fails
    pub async fn new_with_backend(backends: wgpu::Backends) -> Result<Self, GpuDeviceError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuDeviceError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("Using GPU: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("hybris GPU device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter.limits(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .map_err(|e| GpuDeviceError::DeviceRequest(e.to_string()))?;

        Ok(Self {
            device,
            queue,
            adapter,
        })
    }

    /// Get adapter info (GPU name, backend, etc.)
    #[must_use]
    pub fn info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Limits of the created device, in benchmark terms
    #[must_use]
    pub fn hardware_limits(&self) -> HardwareLimits {
        hardware_limits_from(&self.device.limits())
    }

    /// Create GPU buffer with initial data
    pub fn create_buffer_init(
        &self,
        label: &str,
        contents: &[u8],
        usage: wgpu::BufferUsages,
    ) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage,
            })
    }

    /// Create empty GPU buffer
    pub fn create_buffer(&self, label: &str, size: u64, usage: wgpu::BufferUsages) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage,
            mapped_at_creation: false,
        })
    }

    /// Get device reference
    #[must_use]
    pub const fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Get queue reference
    #[must_use]
    pub const fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

/// Translate wgpu limits
///
/// A block can be no larger than either the X dimension limit or the total
/// invocations per workgroup. The bindable buffer size is the smaller of the
/// storage binding limit and the buffer size limit.
#[must_use]
pub fn hardware_limits_from(limits: &wgpu::Limits) -> HardwareLimits {
    HardwareLimits {
        max_threads_per_block: limits
            .max_compute_workgroup_size_x
            .min(limits.max_compute_invocations_per_workgroup),
        max_blocks_per_dispatch: limits.max_compute_workgroups_per_dimension,
        max_single_buffer_size: u64::from(limits.max_storage_buffer_binding_size)
            .min(limits.max_buffer_size),
    }
}
