//! Host-side BFS algorithms and result verification
//!
//! The reference oracle, the CPU backend of the level-synchronous kernels, and
//! the verifier that compares the two sides.

pub mod level_sync;
pub mod traversal;
pub mod verify;

pub use level_sync::{level_synchronous_bfs, LevelSyncResult};
pub use traversal::{eccentricity, reference_bfs};
pub use verify::{find_mismatches, verify_distances, Mismatch};
