//! Queue-based BFS used as the reference oracle
//!
//! Independent of the level-synchronous kernels: a classic FIFO traversal that
//! assigns each node its distance on first discovery.

use crate::storage::{BfsGraph, NodeId, UNREACHED};
use crate::Result;
use std::collections::VecDeque;

/// Hop distances from `source` to every node (`UNREACHED` where no path exists)
///
/// # Errors
///
/// Returns `MalformedInput` if `source` is not a node of the graph
///
/// # Example
///
/// ```
/// use hybris::{reference_bfs, BfsGraph, NodeId, UNREACHED};
///
/// let graph = BfsGraph::from_edge_list(3, &[(NodeId(0), NodeId(1))]).unwrap();
/// let distances = reference_bfs(&graph, NodeId(0)).unwrap();
/// assert_eq!(distances, vec![0, 1, UNREACHED]);
/// ```
pub fn reference_bfs(graph: &BfsGraph, source: NodeId) -> Result<Vec<u32>> {
    graph.check_node(source)?;

    let mut distances = vec![UNREACHED; graph.num_nodes()];
    let mut queue = VecDeque::new();

    distances[source.index()] = 0;
    queue.push_back(source.0);

    while let Some(current) = queue.pop_front() {
        let next = distances[current as usize] + 1;
        for &neighbor in graph.neighbors(NodeId(current))? {
            let slot = &mut distances[neighbor as usize];
            if *slot == UNREACHED {
                *slot = next;
                queue.push_back(neighbor);
            }
        }
    }

    Ok(distances)
}

/// Largest finite distance in `distances` (the source's eccentricity)
#[must_use]
pub fn eccentricity(distances: &[u32]) -> u32 {
    distances
        .iter()
        .copied()
        .filter(|&d| d != UNREACHED)
        .max()
        .unwrap_or(0)
}
