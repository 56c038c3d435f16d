//! Execution-unit partitioning
//!
//! Maps one lane per node onto blocks (workgroups) of at most
//! `max_threads_per_block` lanes.

use crate::error::{BenchError, Result};

/// Accelerator limits the benchmarks validate against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareLimits {
    /// Largest workgroup (block) size
    pub max_threads_per_block: u32,

    /// Largest workgroup count in one dispatch dimension
    pub max_blocks_per_dispatch: u32,

    /// Largest storage buffer that can be bound, in bytes
    pub max_single_buffer_size: u64,
}

impl HardwareLimits {
    /// Limits guaranteed by every WebGPU implementation
    pub const WEBGPU_DEFAULT: Self = Self {
        max_threads_per_block: 256,
        max_blocks_per_dispatch: 65_535,
        max_single_buffer_size: 128 << 20,
    };

    /// Lower `max_threads_per_block` to `cap` if the hardware allows more
    ///
    /// The reference benchmark caps blocks at 512 lanes regardless of the
    /// hardware; a cap above the hardware limit leaves the limit unchanged.
    #[must_use]
    pub fn with_thread_cap(mut self, cap: u32) -> Self {
        if cap > self.max_threads_per_block {
            log::warn!(
                "Requested {cap} threads per block, hardware allows {}; using hardware limit",
                self.max_threads_per_block
            );
        }
        self.max_threads_per_block = self.max_threads_per_block.min(cap).max(1);
        self
    }

    /// Fail with `CapabilityExceeded` if a buffer of `bytes` cannot be bound
    ///
    /// # Errors
    ///
    /// Returns `CapabilityExceeded` naming `resource` when `bytes` exceeds
    /// `max_single_buffer_size`
    pub fn check_buffer(&self, resource: &'static str, bytes: u64) -> Result<()> {
        if bytes > self.max_single_buffer_size {
            return Err(BenchError::CapabilityExceeded {
                resource,
                requested: bytes,
                limit: self.max_single_buffer_size,
            });
        }
        Ok(())
    }
}

impl Default for HardwareLimits {
    fn default() -> Self {
        Self::WEBGPU_DEFAULT
    }
}

/// Blocks × threads-per-block covering every node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionPlan {
    /// Number of blocks to dispatch
    pub block_count: u32,

    /// Lanes per block (the workgroup size)
    pub threads_per_block: u32,
}

impl PartitionPlan {
    /// Plan a dispatch with one lane per item
    ///
    /// Items that fit in one block get a single block sized exactly to the
    /// item count. Larger counts use full blocks; the lanes of the last block
    /// above `item_count` are idle and must be masked off by the kernel.
    ///
    /// # Errors
    ///
    /// - `MalformedInput` if `item_count` is zero
    /// - `CapabilityExceeded` if the block count exceeds
    ///   `max_blocks_per_dispatch`
    ///
    /// # Example
    ///
    /// ```
    /// use hybris::{HardwareLimits, PartitionPlan};
    ///
    /// let limits = HardwareLimits::default().with_thread_cap(512);
    /// let plan = PartitionPlan::for_items(1000, &limits).unwrap();
    /// assert_eq!(plan.threads_per_block, 256);
    /// assert_eq!(plan.block_count, 4);
    /// ```
    pub fn for_items(item_count: u32, limits: &HardwareLimits) -> Result<Self> {
        if item_count == 0 {
            return Err(BenchError::malformed("cannot partition zero work items"));
        }

        let max_threads = limits.max_threads_per_block.max(1);
        let plan = if item_count <= max_threads {
            Self {
                block_count: 1,
                threads_per_block: item_count,
            }
        } else {
            Self {
                block_count: item_count.div_ceil(max_threads),
                threads_per_block: max_threads,
            }
        };

        if plan.block_count > limits.max_blocks_per_dispatch {
            return Err(BenchError::CapabilityExceeded {
                resource: "blocks per dispatch",
                requested: u64::from(plan.block_count),
                limit: u64::from(limits.max_blocks_per_dispatch),
            });
        }

        log::debug!(
            "Partitioned {item_count} items into {} blocks x {} threads",
            plan.block_count,
            plan.threads_per_block
        );
        Ok(plan)
    }

    /// Total lanes launched (including idle lanes of the last block)
    #[must_use]
    pub fn total_lanes(&self) -> u64 {
        u64::from(self.block_count) * u64::from(self.threads_per_block)
    }
}
