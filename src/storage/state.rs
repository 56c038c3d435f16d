//! Per-node traversal state for level-synchronous BFS
//!
//! Flags are stored as one `u32` word per node (0 = clear, 1 = set) so the
//! host arrays upload to WGSL storage buffers without repacking.

use super::graph::{NodeId, UNREACHED};
use crate::error::Result;

/// Frontier masks and distances for one BFS run
///
/// `frontier` and `pending` form the double buffer: expansion reads
/// `frontier` and writes `pending`, commit promotes `pending` into
/// `frontier`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalState {
    /// Active this round
    pub frontier: Vec<u32>,

    /// Becomes active next round
    pub pending: Vec<u32>,

    /// Ever activated
    pub visited: Vec<u32>,

    /// Hop count from the source, `UNREACHED` until relaxed
    pub distance: Vec<u32>,
}

impl TraversalState {
    /// State before the first round: only `source` is active and visited
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if `source` is not a node of the graph
    pub fn seeded(num_nodes: usize, source: NodeId) -> Result<Self> {
        let mut state = Self {
            frontier: vec![0; num_nodes],
            pending: vec![0; num_nodes],
            visited: vec![0; num_nodes],
            distance: vec![UNREACHED; num_nodes],
        };

        let src = source.index();
        if src >= num_nodes {
            return Err(crate::BenchError::malformed(format!(
                "source node {} out of range for graph with {num_nodes} nodes",
                source.0
            )));
        }
        state.frontier[src] = 1;
        state.visited[src] = 1;
        state.distance[src] = 0;

        Ok(state)
    }

    /// Number of nodes covered
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.distance.len()
    }

    /// Check that every array covers exactly `num_nodes` nodes
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` naming the first array of the wrong length
    pub fn check_shape(&self, num_nodes: usize) -> Result<()> {
        for (name, len) in [
            ("frontier", self.frontier.len()),
            ("pending", self.pending.len()),
            ("visited", self.visited.len()),
            ("distance", self.distance.len()),
        ] {
            if len != num_nodes {
                return Err(crate::BenchError::malformed(format!(
                    "traversal state {name} covers {len} nodes, graph has {num_nodes}"
                )));
            }
        }
        Ok(())
    }

    /// True when no node is active
    #[must_use]
    pub fn frontier_is_empty(&self) -> bool {
        self.frontier.iter().all(|&f| f == 0)
    }

    /// Check the state invariants
    ///
    /// - every visited node has a distance
    /// - no node is both active and pending
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let visited_have_distance = self
            .visited
            .iter()
            .zip(&self.distance)
            .all(|(&v, &d)| v == 0 || d != UNREACHED);
        let disjoint = self
            .frontier
            .iter()
            .zip(&self.pending)
            .all(|(&f, &p)| f == 0 || p == 0);
        visited_have_distance && disjoint
    }
}
