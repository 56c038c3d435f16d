//! Compute pipelines for the BFS frontier kernels
//!
//! Both kernels live in `shaders/bfs_frontier.wgsl` and share one bind group
//! layout. The workgroup size is fixed per pipeline, so it is substituted into
//! the shader source from the partition plan.

use super::buffer::BfsDeviceBuffers;
use super::GpuDevice;
use crate::partition::PartitionPlan;

const BFS_SHADER: &str = include_str!("shaders/bfs_frontier.wgsl");

const WORKGROUP_SIZE_PLACEHOLDER: &str = "{{WORKGROUP_SIZE}}";

/// Instantiate a shader template for a given workgroup size
pub(crate) fn shader_source(template: &str, workgroup_size: u32) -> String {
    template.replace(WORKGROUP_SIZE_PLACEHOLDER, &workgroup_size.to_string())
}

pub(crate) fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

pub(crate) fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

pub(crate) fn compute_pipeline(
    device: &GpuDevice,
    label: &str,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    entry_point: &str,
) -> wgpu::ComputePipeline {
    device
        .device()
        .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            module,
            entry_point,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        })
}

/// Expansion and commit pipelines for one partition plan
#[derive(Debug)]
pub struct BfsKernels {
    plan: PartitionPlan,
    bind_group_layout: wgpu::BindGroupLayout,
    expand: wgpu::ComputePipeline,
    commit: wgpu::ComputePipeline,
}

impl BfsKernels {
    /// Compile both kernels with `plan.threads_per_block` lanes per workgroup
    #[must_use]
    pub fn new(device: &GpuDevice, plan: PartitionPlan) -> Self {
        let source = shader_source(BFS_SHADER, plan.threads_per_block);
        let shader_module = device
            .device()
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("BFS Frontier Shader"),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });

        let bind_group_layout =
            device
                .device()
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("BFS Bind Group Layout"),
                    entries: &[
                        uniform_entry(0),
                        // topology
                        storage_entry(1, true),
                        storage_entry(2, true),
                        storage_entry(3, true),
                        // frontier, pending, visited, cost, continue flag
                        storage_entry(4, false),
                        storage_entry(5, false),
                        storage_entry(6, false),
                        storage_entry(7, false),
                        storage_entry(8, false),
                    ],
                });

        let pipeline_layout = device
            .device()
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("BFS Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let expand = compute_pipeline(
            device,
            "BFS Expand Pipeline",
            &pipeline_layout,
            &shader_module,
            "expand_frontier",
        );
        let commit = compute_pipeline(
            device,
            "BFS Commit Pipeline",
            &pipeline_layout,
            &shader_module,
            "commit_frontier",
        );

        Self {
            plan,
            bind_group_layout,
            expand,
            commit,
        }
    }

    /// Partition plan the kernels were compiled for
    #[must_use]
    pub const fn plan(&self) -> PartitionPlan {
        self.plan
    }

    /// Bind one run's buffers
    #[must_use]
    pub fn bind(&self, device: &GpuDevice, buffers: &BfsDeviceBuffers) -> wgpu::BindGroup {
        let resources = [
            &buffers.params,
            &buffers.edge_start,
            &buffers.edge_degree,
            &buffers.edges,
            &buffers.frontier,
            &buffers.pending,
            &buffers.visited,
            &buffers.distance,
            &buffers.continue_flag,
        ];
        let entries: Vec<wgpu::BindGroupEntry<'_>> = (0_u32..)
            .zip(resources)
            .map(|(binding, buffer)| wgpu::BindGroupEntry {
                binding,
                resource: buffer.as_entire_binding(),
            })
            .collect();

        device
            .device()
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("BFS Bind Group"),
                layout: &self.bind_group_layout,
                entries: &entries,
            })
    }

    /// Record one round: expansion over every lane, then commit over every lane
    ///
    /// Each kernel gets its own compute pass so the commit pass starts only
    /// after every expansion lane has finished and its writes are visible.
    pub fn encode_round(&self, encoder: &mut wgpu::CommandEncoder, bind_group: &wgpu::BindGroup) {
        for (label, pipeline) in [
            ("BFS Expand Pass", &self.expand),
            ("BFS Commit Pass", &self.commit),
        ] {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(label),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(pipeline);
            compute_pass.set_bind_group(0, bind_group, &[]);
            compute_pass.dispatch_workgroups(self.plan.block_count, 1, 1);
        }
    }
}
