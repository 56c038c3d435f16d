//! Property-based tests for hybris
//!
//! Checks the level-synchronous BFS properties for arbitrary graphs

use hybris::algorithms::level_sync::{commit_lanes, expand_lanes};
use hybris::{
    eccentricity, find_mismatches, level_synchronous_bfs, reference_bfs, verify_distances,
    BfsGraph, HardwareLimits, NodeId, PartitionPlan, TraversalState, UNREACHED,
};
use proptest::prelude::*;
use std::collections::HashSet;

/// Graph with `1..max_nodes` nodes and up to `max_edges` random edges
fn prop_graph(max_nodes: u32, max_edges: usize) -> impl Strategy<Value = BfsGraph> {
    (1..max_nodes).prop_flat_map(move |n| {
        prop::collection::vec((0..n, 0..n), 0..max_edges).prop_map(move |pairs| {
            let edges: Vec<_> = pairs
                .into_iter()
                .map(|(src, dst)| (NodeId(src), NodeId(dst)))
                .collect();
            BfsGraph::from_edge_list(n as usize, &edges).unwrap()
        })
    })
}

/// Run BFS with a fixed lane order in both kernels
fn bfs_with_lane_order(graph: &BfsGraph, order: &[usize]) -> (Vec<u32>, u32) {
    let mut state = TraversalState::seeded(graph.num_nodes(), NodeId(0)).unwrap();
    let mut rounds = 0;
    loop {
        rounds += 1;
        expand_lanes(graph, &mut state, order.iter().copied()).unwrap();
        if !commit_lanes(&mut state, order.iter().copied()).unwrap() {
            break;
        }
    }
    (state.distance, rounds)
}

// Property: the CPU kernels agree with the queue-based oracle
proptest! {
    #[test]
    fn prop_level_sync_matches_oracle(graph in prop_graph(60, 200)) {
        let result = level_synchronous_bfs(&graph, NodeId(0)).unwrap();
        let oracle = reference_bfs(&graph, NodeId(0)).unwrap();
        prop_assert_eq!(result.distances, oracle);
    }
}

// Property: lane scheduling order does not change the result
proptest! {
    #[test]
    fn prop_determinism_under_lane_order(
        (graph, order) in prop_graph(40, 120).prop_flat_map(|graph| {
            let lanes: Vec<usize> = (0..graph.num_nodes()).collect();
            (Just(graph), Just(lanes).prop_shuffle())
        })
    ) {
        let in_order = level_synchronous_bfs(&graph, NodeId(0)).unwrap();
        let (distances, rounds) = bfs_with_lane_order(&graph, &order);

        prop_assert_eq!(distances, in_order.distances);
        prop_assert_eq!(rounds, in_order.rounds);
    }
}

// Property: rounds == eccentricity of the source + 1
proptest! {
    #[test]
    fn prop_rounds_are_eccentricity_plus_one(graph in prop_graph(60, 200)) {
        let result = level_synchronous_bfs(&graph, NodeId(0)).unwrap();
        prop_assert_eq!(result.rounds, eccentricity(&result.distances) + 1);
    }
}

// Property: UNREACHED exactly for nodes with no directed path from the source
proptest! {
    #[test]
    fn prop_reachability_closure(graph in prop_graph(50, 120)) {
        let result = level_synchronous_bfs(&graph, NodeId(0)).unwrap();

        // Fixed-point closure over the edge list
        let mut reachable: HashSet<usize> = HashSet::from([0]);
        loop {
            let before = reachable.len();
            for node in 0..graph.num_nodes() {
                if reachable.contains(&node) {
                    for &dst in graph.neighbors(NodeId(node as u32)).unwrap() {
                        reachable.insert(dst as usize);
                    }
                }
            }
            if reachable.len() == before {
                break;
            }
        }

        for (node, &distance) in result.distances.iter().enumerate() {
            prop_assert_eq!(distance == UNREACHED, !reachable.contains(&node));
        }
    }
}

// Property: every reached node other than the source has a predecessor one hop closer
proptest! {
    #[test]
    fn prop_distances_have_predecessors(graph in prop_graph(50, 150)) {
        let result = level_synchronous_bfs(&graph, NodeId(0)).unwrap();
        let d = &result.distances;

        for node in 1..graph.num_nodes() {
            if d[node] == UNREACHED {
                continue;
            }
            let has_parent = (0..graph.num_nodes()).any(|src| {
                d[src] != UNREACHED
                    && d[src] + 1 == d[node]
                    && graph.neighbors(NodeId(src as u32)).unwrap().contains(&(node as u32))
            });
            prop_assert!(has_parent, "node {} at distance {} has no parent", node, d[node]);
        }
    }
}

// Property: verification is idempotent
proptest! {
    #[test]
    fn prop_verification_idempotent(
        (computed, reference) in (1usize..64).prop_flat_map(|n| (
            prop::collection::vec(prop_oneof![Just(UNREACHED), 0u32..8], n),
            prop::collection::vec(prop_oneof![Just(UNREACHED), 0u32..8], n),
        ))
    ) {
        let first = verify_distances(&computed, &reference).is_ok();
        let second = verify_distances(&computed, &reference).is_ok();
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, computed == reference);
        prop_assert_eq!(
            find_mismatches(&computed, &reference),
            find_mismatches(&computed, &reference)
        );
    }
}

// Property: partition plans cover every item within the limits
proptest! {
    #[test]
    fn prop_partition_covers_items(items in 1u32..60_000, cap in 1u32..1024) {
        let limits = HardwareLimits::default().with_thread_cap(cap);
        let plan = PartitionPlan::for_items(items, &limits).unwrap();

        prop_assert!(plan.threads_per_block >= 1);
        prop_assert!(plan.threads_per_block <= limits.max_threads_per_block);
        prop_assert!(plan.block_count <= limits.max_blocks_per_dispatch);
        prop_assert!(plan.total_lanes() >= u64::from(items));
        // No fully idle block
        prop_assert!(plan.total_lanes() - u64::from(items) < u64::from(plan.threads_per_block));
        if items <= limits.max_threads_per_block {
            prop_assert_eq!(plan.block_count, 1);
            prop_assert_eq!(plan.threads_per_block, items);
        }
    }
}
