//! Static directed graph in CSR layout with explicit per-node degrees
//!
//! # Layout
//!
//! ```text
//! Graph: 0 → 1, 0 → 2, 1 → 3
//!
//!   edge_start:  [0, 2, 3, 3]   // first edge index per node
//!   edge_degree: [2, 1, 0, 0]   // edge count per node
//!   edges:       [1, 2, 3]      // destination node ids
//! ```
//!
//! Node `i` owns `edges[edge_start[i]..edge_start[i] + edge_degree[i]]`,
//! the same shape as the benchmark input files.

use crate::error::{BenchError, Result};

/// Distance sentinel for nodes not (yet) reached from the source
pub const UNREACHED: u32 = u32::MAX;

/// Node identifier (zero-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Index into per-node arrays
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Directed, unweighted graph ready for upload
///
/// # Example
///
/// ```
/// use hybris::{BfsGraph, NodeId};
///
/// let graph = BfsGraph::from_parts(vec![0, 2, 3, 3], vec![2, 1, 0, 0], vec![1, 2, 3]).unwrap();
/// assert_eq!(graph.num_nodes(), 4);
/// assert_eq!(graph.neighbors(NodeId(0)).unwrap(), &[1, 2]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BfsGraph {
    /// First edge index per node
    edge_start: Vec<u32>,

    /// Edge count per node
    edge_degree: Vec<u32>,

    /// Flattened adjacency (destination node ids)
    edges: Vec<u32>,
}

impl BfsGraph {
    /// Build a graph from raw CSR arrays
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if:
    /// - `edge_start` and `edge_degree` differ in length
    /// - a node's edge range overruns `edges`
    /// - an edge names a destination outside `0..num_nodes`
    /// - a count does not fit in `u32`
    pub fn from_parts(edge_start: Vec<u32>, edge_degree: Vec<u32>, edges: Vec<u32>) -> Result<Self> {
        if edge_start.len() != edge_degree.len() {
            return Err(BenchError::malformed(format!(
                "{} edge starts but {} edge degrees",
                edge_start.len(),
                edge_degree.len()
            )));
        }

        let num_nodes = u32::try_from(edge_start.len())
            .map_err(|_| BenchError::malformed("node count does not fit in u32"))?;
        let num_edges = u32::try_from(edges.len())
            .map_err(|_| BenchError::malformed("edge count does not fit in u32"))?;

        for (node, (&start, &degree)) in edge_start.iter().zip(&edge_degree).enumerate() {
            let end = start.checked_add(degree).filter(|&end| end <= num_edges);
            if end.is_none() {
                return Err(BenchError::malformed(format!(
                    "node {node}: edge range {start}+{degree} exceeds edge count {num_edges}"
                )));
            }
        }

        if let Some((index, &dst)) = edges.iter().enumerate().find(|&(_, &dst)| dst >= num_nodes) {
            return Err(BenchError::malformed(format!(
                "edge {index}: destination {dst} out of range for {num_nodes} nodes"
            )));
        }

        Ok(Self {
            edge_start,
            edge_degree,
            edges,
        })
    }

    /// Build a contiguous CSR graph from an edge list
    ///
    /// Edges keep their relative order per source node. `num_nodes` must cover
    /// every endpoint.
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if an endpoint is `>= num_nodes`
    pub fn from_edge_list(num_nodes: usize, edge_list: &[(NodeId, NodeId)]) -> Result<Self> {
        let mut adjacency: Vec<Vec<u32>> = vec![Vec::new(); num_nodes];
        for &(src, dst) in edge_list {
            if src.index() >= num_nodes || dst.index() >= num_nodes {
                return Err(BenchError::malformed(format!(
                    "edge {} -> {} out of range for {num_nodes} nodes",
                    src.0, dst.0
                )));
            }
            adjacency[src.index()].push(dst.0);
        }

        let mut edge_start = Vec::with_capacity(num_nodes);
        let mut edge_degree = Vec::with_capacity(num_nodes);
        let mut edges = Vec::with_capacity(edge_list.len());

        for neighbors in adjacency {
            let start = u32::try_from(edges.len())
                .map_err(|_| BenchError::malformed("edge count does not fit in u32"))?;
            let degree = u32::try_from(neighbors.len())
                .map_err(|_| BenchError::malformed("node degree does not fit in u32"))?;
            edge_start.push(start);
            edge_degree.push(degree);
            edges.extend(neighbors);
        }

        Self::from_parts(edge_start, edge_degree, edges)
    }

    /// Number of nodes
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.edge_start.len()
    }

    /// Number of edges
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// First edge index per node
    #[must_use]
    pub fn edge_start(&self) -> &[u32] {
        &self.edge_start
    }

    /// Edge count per node
    #[must_use]
    pub fn edge_degree(&self) -> &[u32] {
        &self.edge_degree
    }

    /// Flattened adjacency
    #[must_use]
    pub fn edges(&self) -> &[u32] {
        &self.edges
    }

    /// Outgoing neighbors of a node
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if the node id is out of bounds
    pub fn neighbors(&self, node: NodeId) -> Result<&[u32]> {
        let idx = node.index();
        if idx >= self.num_nodes() {
            return Err(BenchError::malformed(format!(
                "node {} out of bounds for {} nodes",
                node.0,
                self.num_nodes()
            )));
        }

        // Ranges were validated at construction
        let start = self.edge_start[idx] as usize;
        let end = start + self.edge_degree[idx] as usize;
        Ok(&self.edges[start..end])
    }

    /// Check that `node` exists
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` naming the node if it is out of range
    pub fn check_node(&self, node: NodeId) -> Result<()> {
        if node.index() < self.num_nodes() {
            Ok(())
        } else {
            Err(BenchError::malformed(format!(
                "source node {} out of range for graph with {} nodes",
                node.0,
                self.num_nodes()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond_edges() -> Vec<(NodeId, NodeId)> {
        vec![
            (NodeId(0), NodeId(1)),
            (NodeId(0), NodeId(2)),
            (NodeId(1), NodeId(3)),
        ]
    }

    #[test]
    fn test_from_edge_list_builds_contiguous_csr() {
        let graph = BfsGraph::from_edge_list(4, &diamond_edges()).unwrap();

        assert_eq!(graph.num_nodes(), 4);
        assert_eq!(graph.num_edges(), 3);
        assert_eq!(graph.edge_start(), &[0, 2, 3, 3]);
        assert_eq!(graph.edge_degree(), &[2, 1, 0, 0]);
        assert_eq!(graph.edges(), &[1, 2, 3]);
    }

    #[test]
    fn test_neighbors() {
        let graph = BfsGraph::from_edge_list(4, &diamond_edges()).unwrap();

        assert_eq!(graph.neighbors(NodeId(0)).unwrap(), &[1, 2]);
        assert_eq!(graph.neighbors(NodeId(1)).unwrap(), &[3]);
        assert!(graph.neighbors(NodeId(3)).unwrap().is_empty());
        assert!(graph.neighbors(NodeId(4)).is_err());
    }

    #[test]
    fn test_from_parts_rejects_overrun() {
        // Node 1 claims edges [2, 4) but only 3 edges exist
        let err = BfsGraph::from_parts(vec![0, 2], vec![2, 2], vec![1, 0, 1]).unwrap_err();
        assert!(matches!(err, BenchError::MalformedInput(_)));
    }

    #[test]
    fn test_from_parts_rejects_start_overflow() {
        let err = BfsGraph::from_parts(vec![u32::MAX], vec![2], vec![0, 0]).unwrap_err();
        assert!(matches!(err, BenchError::MalformedInput(_)));
    }

    #[test]
    fn test_from_parts_rejects_dangling_destination() {
        let err = BfsGraph::from_parts(vec![0, 1], vec![1, 0], vec![5]).unwrap_err();
        assert!(err.to_string().contains("destination 5"));
    }

    #[test]
    fn test_from_parts_rejects_length_mismatch() {
        assert!(BfsGraph::from_parts(vec![0, 0], vec![0], vec![]).is_err());
    }

    #[test]
    fn test_single_node_graph() {
        let graph = BfsGraph::from_parts(vec![0], vec![0], vec![]).unwrap();
        assert_eq!(graph.num_nodes(), 1);
        assert_eq!(graph.num_edges(), 0);
        assert!(graph.check_node(NodeId(0)).is_ok());
        assert!(graph.check_node(NodeId(1)).is_err());
    }

    #[test]
    fn test_from_edge_list_rejects_out_of_range() {
        let err = BfsGraph::from_edge_list(2, &[(NodeId(0), NodeId(2))]).unwrap_err();
        assert!(matches!(err, BenchError::MalformedInput(_)));
    }
}
