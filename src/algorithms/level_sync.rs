//! Host execution of the level-synchronous BFS kernels
//!
//! Runs the same per-lane contracts as `gpu/shaders/bfs_frontier.wgsl`, one
//! lane at a time, with the same round accounting as the GPU controller. Lane
//! order does not affect the result: every lane writing a shared target in one
//! round is at the same level and writes the same distance, and `pending` and
//! the continue flag are only ever set.

use crate::error::{BenchError, Result};
use crate::storage::{BfsGraph, NodeId, TraversalState};

/// CPU BFS result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSyncResult {
    /// Distance from source to each node (`UNREACHED` for unreachable)
    pub distances: Vec<u32>,

    /// Rounds executed, including the final round that found nothing pending
    pub rounds: u32,
}

/// Expansion kernel body for one lane
fn expand_lane(graph: &BfsGraph, state: &mut TraversalState, tid: usize) {
    if tid >= state.num_nodes() || state.frontier[tid] == 0 {
        return;
    }
    state.frontier[tid] = 0;

    let start = graph.edge_start()[tid] as usize;
    let end = start + graph.edge_degree()[tid] as usize;
    let next = state.distance[tid].saturating_add(1);

    for &dst in &graph.edges()[start..end] {
        let dst = dst as usize;
        if state.visited[dst] == 0 {
            state.distance[dst] = next;
            state.pending[dst] = 1;
        }
    }
}

/// Commit kernel body for one lane; returns the lane's continue-flag write
fn commit_lane(state: &mut TraversalState, tid: usize) -> bool {
    if tid >= state.num_nodes() || state.pending[tid] == 0 {
        return false;
    }
    state.frontier[tid] = 1;
    state.visited[tid] = 1;
    state.pending[tid] = 0;
    true
}

/// Run the expansion kernel over `lanes` in the given order
///
/// Lanes at or above the node count are idle.
///
/// # Errors
///
/// Returns `MalformedInput` if `state` does not cover exactly the graph's nodes
pub fn expand_lanes(
    graph: &BfsGraph,
    state: &mut TraversalState,
    lanes: impl IntoIterator<Item = usize>,
) -> Result<()> {
    state.check_shape(graph.num_nodes())?;
    for tid in lanes {
        expand_lane(graph, state, tid);
    }
    Ok(())
}

/// Run the commit kernel over `lanes`; returns the continue flag
///
/// # Errors
///
/// Returns `MalformedInput` if the state arrays differ in length
pub fn commit_lanes(
    state: &mut TraversalState,
    lanes: impl IntoIterator<Item = usize>,
) -> Result<bool> {
    state.check_shape(state.num_nodes())?;
    let mut continue_flag = false;
    for tid in lanes {
        continue_flag |= commit_lane(state, tid);
    }
    Ok(continue_flag)
}

/// One full round: expansion over every lane, then commit over every lane
///
/// # Errors
///
/// Returns `MalformedInput` if `state` does not cover exactly the graph's nodes
pub fn run_round(graph: &BfsGraph, state: &mut TraversalState) -> Result<bool> {
    let n = state.num_nodes();
    expand_lanes(graph, state, 0..n)?;
    commit_lanes(state, 0..n)
}

/// Level-synchronous BFS on the host
///
/// # Errors
///
/// - `MalformedInput` if `source` is not a node of the graph
/// - `NonConvergence` if more than `num_nodes + 1` rounds run (unreachable for
///   a valid graph)
///
/// # Example
///
/// ```
/// use hybris::{level_synchronous_bfs, BfsGraph, NodeId};
///
/// let graph = BfsGraph::from_parts(vec![0, 2, 3, 3], vec![2, 1, 0, 0], vec![1, 2, 3]).unwrap();
/// let result = level_synchronous_bfs(&graph, NodeId(0)).unwrap();
/// assert_eq!(result.distances, vec![0, 1, 1, 2]);
/// assert_eq!(result.rounds, 3);
/// ```
pub fn level_synchronous_bfs(graph: &BfsGraph, source: NodeId) -> Result<LevelSyncResult> {
    let mut state = TraversalState::seeded(graph.num_nodes(), source)?;
    let max_rounds = u32::try_from(graph.num_nodes())
        .unwrap_or(u32::MAX)
        .saturating_add(1);

    let mut rounds = 0_u32;
    loop {
        if rounds == max_rounds {
            return Err(BenchError::NonConvergence { rounds });
        }
        rounds += 1;
        if !run_round(graph, &mut state)? {
            break;
        }
    }

    Ok(LevelSyncResult {
        distances: state.distance,
        rounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::UNREACHED;

    fn diamond() -> BfsGraph {
        BfsGraph::from_parts(vec![0, 2, 3, 3], vec![2, 1, 0, 0], vec![1, 2, 3]).unwrap()
    }

    #[test]
    fn test_diamond_rounds_and_distances() {
        let result = level_synchronous_bfs(&diamond(), NodeId(0)).unwrap();
        assert_eq!(result.distances, vec![0, 1, 1, 2]);
        assert_eq!(result.rounds, 3);
    }

    #[test]
    fn test_round_by_round_state() {
        let graph = diamond();
        let mut state = TraversalState::seeded(4, NodeId(0)).unwrap();

        // Round 1 activates 1 and 2
        assert!(run_round(&graph, &mut state).unwrap());
        assert_eq!(state.frontier, vec![0, 1, 1, 0]);
        assert_eq!(state.visited, vec![1, 1, 1, 0]);
        assert!(state.is_consistent());

        // Round 2 activates 3
        assert!(run_round(&graph, &mut state).unwrap());
        assert_eq!(state.frontier, vec![0, 0, 0, 1]);
        assert_eq!(state.distance, vec![0, 1, 1, 2]);

        // Round 3 finds nothing pending
        assert!(!run_round(&graph, &mut state).unwrap());
        assert!(state.frontier_is_empty());
        assert!(state.pending.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_single_node_converges_in_one_round() {
        let graph = BfsGraph::from_parts(vec![0], vec![0], vec![]).unwrap();
        let result = level_synchronous_bfs(&graph, NodeId(0)).unwrap();
        assert_eq!(result.distances, vec![0]);
        assert_eq!(result.rounds, 1);
    }

    #[test]
    fn test_isolated_node_stays_unreached() {
        let graph = BfsGraph::from_edge_list(
            4,
            &[(NodeId(0), NodeId(1)), (NodeId(1), NodeId(2))],
        )
        .unwrap();

        let result = level_synchronous_bfs(&graph, NodeId(0)).unwrap();
        assert_eq!(result.distances, vec![0, 1, 2, UNREACHED]);
    }

    #[test]
    fn test_self_loop_and_cycle_terminate() {
        let graph = BfsGraph::from_edge_list(
            3,
            &[
                (NodeId(0), NodeId(0)),
                (NodeId(0), NodeId(1)),
                (NodeId(1), NodeId(2)),
                (NodeId(2), NodeId(0)),
            ],
        )
        .unwrap();

        let result = level_synchronous_bfs(&graph, NodeId(0)).unwrap();
        assert_eq!(result.distances, vec![0, 1, 2]);
        assert_eq!(result.rounds, 3);
    }

    #[test]
    fn test_reverse_lane_order_gives_same_state() {
        let graph = BfsGraph::from_edge_list(
            5,
            &[
                (NodeId(0), NodeId(1)),
                (NodeId(0), NodeId(2)),
                (NodeId(1), NodeId(3)),
                (NodeId(2), NodeId(3)),
                (NodeId(3), NodeId(4)),
            ],
        )
        .unwrap();

        let mut forward = TraversalState::seeded(5, NodeId(0)).unwrap();
        let mut backward = forward.clone();
        loop {
            expand_lanes(&graph, &mut forward, 0..5).unwrap();
            expand_lanes(&graph, &mut backward, (0..5).rev()).unwrap();
            let f = commit_lanes(&mut forward, 0..5).unwrap();
            let b = commit_lanes(&mut backward, (0..5).rev()).unwrap();
            assert_eq!(forward, backward);
            assert_eq!(f, b);
            if !f {
                break;
            }
        }
        assert_eq!(forward.distance, vec![0, 1, 1, 2, 3]);
    }

    #[test]
    fn test_idle_lanes_are_masked() {
        let graph = diamond();
        let mut state = TraversalState::seeded(4, NodeId(0)).unwrap();
        let before = state.clone();

        // Lanes past node_count do nothing
        expand_lanes(&graph, &mut state, 4..512).unwrap();
        assert!(!commit_lanes(&mut state, 4..512).unwrap());
        assert_eq!(state, before);
    }

    #[test]
    fn test_state_larger_than_graph_rejected() {
        let graph = BfsGraph::from_parts(vec![0, 1], vec![1, 0], vec![1]).unwrap();
        let mut state = TraversalState::seeded(4, NodeId(0)).unwrap();
        state.frontier[3] = 1;

        let err = expand_lanes(&graph, &mut state, 0..4).unwrap_err();
        assert!(matches!(err, BenchError::MalformedInput(_)));
        assert!(matches!(
            run_round(&graph, &mut state),
            Err(BenchError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_state_smaller_than_graph_rejected() {
        let graph = BfsGraph::from_edge_list(
            3,
            &[(NodeId(0), NodeId(1)), (NodeId(1), NodeId(2))],
        )
        .unwrap();
        let mut state = TraversalState::seeded(1, NodeId(0)).unwrap();

        let err = expand_lanes(&graph, &mut state, 0..1).unwrap_err();
        assert!(matches!(err, BenchError::MalformedInput(_)));
        assert_eq!(state.distance, vec![0]);
    }

    #[test]
    fn test_ragged_state_rejected_by_commit() {
        let mut state = TraversalState::seeded(3, NodeId(0)).unwrap();
        state.pending.truncate(1);

        assert!(matches!(
            commit_lanes(&mut state, 0..3),
            Err(BenchError::MalformedInput(_))
        ));
    }
}
