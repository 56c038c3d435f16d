//! GPU BFS convergence controller
//!
//! Level-synchronous BFS driven from the host. Each round resets the continue
//! flag, submits expansion + commit as one command batch, and blocks on the
//! flag readback before deciding whether another round is needed. Rounds are
//! strictly sequential: round k+1 reads the frontier committed by round k.

use super::buffer::BfsDeviceBuffers;
use super::kernels::BfsKernels;
use super::GpuDevice;
use crate::error::{BenchError, Result};
use crate::partition::{HardwareLimits, PartitionPlan};
use crate::storage::{BfsGraph, NodeId, TraversalState, UNREACHED};

/// GPU BFS result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuBfsResult {
    /// Distance from source to each node (`UNREACHED` for unreachable)
    pub distances: Vec<u32>,

    /// Rounds executed, including the final round that found nothing pending
    pub rounds: u32,
}

impl GpuBfsResult {
    /// Get distance to a specific node
    #[must_use]
    pub fn distance(&self, node: NodeId) -> Option<u32> {
        self.distances
            .get(node.index())
            .copied()
            .filter(|&d| d != UNREACHED)
    }

    /// Check if node is reachable from source
    #[must_use]
    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.distance(node).is_some()
    }

    /// Number of nodes reached
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.distances.iter().filter(|&&d| d != UNREACHED).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Round(u32),
    Done(u32),
}

/// Iterate rounds until the continue flag comes back clear
async fn converge(
    device: &GpuDevice,
    kernels: &BfsKernels,
    buffers: &BfsDeviceBuffers,
    bind_group: &wgpu::BindGroup,
    max_rounds: u32,
) -> Result<u32> {
    let mut phase = Phase::Round(1);

    loop {
        match phase {
            Phase::Round(round) if round > max_rounds => {
                return Err(BenchError::NonConvergence { rounds: max_rounds });
            }
            Phase::Round(round) => {
                buffers.reset_continue_flag(device);

                let mut encoder =
                    device
                        .device()
                        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("BFS Round Encoder"),
                        });
                kernels.encode_round(&mut encoder, bind_group);
                device.queue().submit(Some(encoder.finish()));

                let continue_flag = buffers.download_continue_flag(device).await?;
                log::debug!("BFS round {round}: continue flag {continue_flag}");

                phase = if continue_flag {
                    Phase::Round(round + 1)
                } else {
                    Phase::Done(round)
                };
            }
            Phase::Done(rounds) => return Ok(rounds),
        }
    }
}

/// Run GPU BFS from `source`
///
/// Partitions one lane per node within `limits`, uploads the graph with only
/// `source` active, iterates rounds to convergence, and downloads distances.
/// All device buffers are released when this returns.
///
/// # Errors
///
/// Returns error if:
/// - `source` is not a node of the graph (`MalformedInput`)
/// - the graph exceeds `limits` (`CapabilityExceeded`)
/// - the device rejects an allocation (`AllocationFailure`)
/// - a readback fails (`Readback`)
///
/// # Example
///
/// ```ignore
/// # use hybris::gpu::{gpu_bfs, GpuDevice};
/// # use hybris::{BfsGraph, NodeId};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let device = GpuDevice::new().await?;
/// let graph = BfsGraph::from_parts(vec![0, 2, 3, 3], vec![2, 1, 0, 0], vec![1, 2, 3])?;
///
/// let result = gpu_bfs(&device, &graph, NodeId(0), &device.hardware_limits()).await?;
///
/// assert_eq!(result.distances, vec![0, 1, 1, 2]);
/// assert_eq!(result.rounds, 3);
/// # Ok(())
/// # }
/// ```
pub async fn gpu_bfs(
    device: &GpuDevice,
    graph: &BfsGraph,
    source: NodeId,
    limits: &HardwareLimits,
) -> Result<GpuBfsResult> {
    graph.check_node(source)?;
    let node_count = u32::try_from(graph.num_nodes())
        .map_err(|_| BenchError::malformed("node count does not fit in u32"))?;

    let plan = PartitionPlan::for_items(node_count, limits)?;
    BfsDeviceBuffers::check_capacity(graph, limits)?;
    let kernels = BfsKernels::new(device, plan);

    let buffers = {
        let state = TraversalState::seeded(graph.num_nodes(), source)?;
        BfsDeviceBuffers::upload(device, graph, &state, limits).await?
    };
    let bind_group = kernels.bind(device, &buffers);

    // Each node commits at most once, plus the final empty round
    let rounds = converge(
        device,
        &kernels,
        &buffers,
        &bind_group,
        node_count.saturating_add(1),
    )
    .await?;

    let distances = buffers.download_distances(device).await?;

    Ok(GpuBfsResult { distances, rounds })
}
