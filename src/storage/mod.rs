//! Graph storage layer
//!
//! CSR graph representation, the benchmark's text formats, and per-node
//! traversal state.

pub mod graph;
pub mod loader;
pub mod reference;
pub mod state;

pub use graph::{BfsGraph, NodeId, UNREACHED};
pub use loader::{load_graph, parse_graph, GraphFile};
pub use reference::{load_reference, parse_reference, write_reference};
pub use state::TraversalState;
