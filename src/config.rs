//! Harness configuration
//!
//! Loaded from JSON. Every field has a default, so `{}` (or no file at all)
//! is a valid configuration.
//!
//! ```json
//! {
//!   "bfs": { "source": 0, "max_threads_per_block": 512, "verify": true },
//!   "vector_add": { "len": 100000, "max_value": 1024 }
//! }
//! ```

use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Threads-per-block cap used by the reference BFS benchmark
pub const DEFAULT_MAX_THREADS_PER_BLOCK: u32 = 512;

/// BFS benchmark settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BfsConfig {
    /// Traversal source node
    ///
    /// Defaults to node 0 regardless of the source named in the graph file;
    /// published reference results assume node 0.
    pub source: u32,

    /// Upper bound on lanes per block (lowered to the hardware limit)
    pub max_threads_per_block: u32,

    /// Compare results against a reference after the run
    pub verify: bool,
}

impl Default for BfsConfig {
    fn default() -> Self {
        Self {
            source: 0,
            max_threads_per_block: DEFAULT_MAX_THREADS_PER_BLOCK,
            verify: true,
        }
    }
}

/// Vector-addition benchmark settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VectorAddConfig {
    /// Number of elements
    pub len: u32,

    /// Every `a[i] + b[i]` must equal this value
    pub max_value: u32,
}

impl Default for VectorAddConfig {
    fn default() -> Self {
        Self {
            len: 100_000,
            max_value: 1024,
        }
    }
}

/// Top-level harness configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// BFS settings
    pub bfs: BfsConfig,

    /// Vector-add settings
    pub vector_add: VectorAddConfig,
}

impl HarnessConfig {
    /// Parse a JSON configuration
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` on invalid JSON or unknown fields
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| BenchError::malformed(format!("invalid configuration: {e}")))
    }

    /// Read a JSON configuration file
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise as
    /// [`HarnessConfig::from_json_str`]
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| BenchError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let config = HarnessConfig::from_json_str("{}").unwrap();
        assert_eq!(config, HarnessConfig::default());
        assert_eq!(config.bfs.source, 0);
        assert_eq!(config.bfs.max_threads_per_block, 512);
        assert!(config.bfs.verify);
        assert_eq!(config.vector_add.len, 100_000);
    }

    #[test]
    fn test_partial_override() {
        let config =
            HarnessConfig::from_json_str(r#"{"bfs": {"max_threads_per_block": 128}}"#).unwrap();
        assert_eq!(config.bfs.max_threads_per_block, 128);
        assert_eq!(config.bfs.source, 0);
        assert_eq!(config.vector_add, VectorAddConfig::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = HarnessConfig::from_json_str(r#"{"bfs": {"sauce": 1}}"#).unwrap_err();
        assert!(matches!(err, BenchError::MalformedInput(_)));
    }

    #[tokio::test]
    async fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hybris.json");
        std::fs::write(&path, r#"{"vector_add": {"len": 64, "max_value": 8}}"#).unwrap();

        let config = HarnessConfig::from_json_file(&path).await.unwrap();
        assert_eq!(config.vector_add.len, 64);
        assert_eq!(config.vector_add.max_value, 8);
    }
}
