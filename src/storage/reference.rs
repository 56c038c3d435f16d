//! Reference-result files: one `"<index>) cost:<distance>"` record per node
//!
//! Unreached nodes are written as `-1`. Both `-1` and `4294967295` parse to
//! [`UNREACHED`].

use super::graph::UNREACHED;
use crate::error::{BenchError, Result};
use std::fmt;
use std::path::Path;

fn parse_cost(token: &str, line: usize) -> Result<u32> {
    if token == "-1" {
        return Ok(UNREACHED);
    }
    token
        .parse::<u32>()
        .map_err(|_| BenchError::malformed(format!("line {line}: invalid cost {token:?}")))
}

/// Parse reference distances, keyed by node index
///
/// Records must appear in node-index order starting at 0.
///
/// # Errors
///
/// Returns `MalformedInput` if a record does not match `"<index>) cost:<uint>"`
/// or indices are out of order.
///
/// # Example
///
/// ```
/// use hybris::{storage::parse_reference, UNREACHED};
///
/// let costs = parse_reference("0) cost:0\n1) cost:1\n2) cost:-1\n").unwrap();
/// assert_eq!(costs, vec![0, 1, UNREACHED]);
/// ```
pub fn parse_reference(text: &str) -> Result<Vec<u32>> {
    let mut costs = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let record = raw.trim();
        if record.is_empty() {
            continue;
        }

        let (index, rest) = record
            .split_once(')')
            .ok_or_else(|| BenchError::malformed(format!("line {line}: missing ')' in {record:?}")))?;
        let index: usize = index.trim().parse().map_err(|_| {
            BenchError::malformed(format!("line {line}: invalid node index {index:?}"))
        })?;
        let cost = rest
            .trim()
            .strip_prefix("cost:")
            .ok_or_else(|| BenchError::malformed(format!("line {line}: missing 'cost:' field")))?;

        if index != costs.len() {
            return Err(BenchError::malformed(format!(
                "line {line}: expected record for node {}, found node {index}",
                costs.len()
            )));
        }
        costs.push(parse_cost(cost.trim(), line)?);
    }

    Ok(costs)
}

/// Read and parse a reference-result file
///
/// # Errors
///
/// Returns `Io` if the file cannot be read, otherwise as [`parse_reference`]
pub async fn load_reference(path: impl AsRef<Path>) -> Result<Vec<u32>> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| BenchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_reference(&text)
}

/// A cost as written in reference files
struct Cost(u32);

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == UNREACHED {
            f.write_str("-1")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Render distances in the reference-result format
#[must_use]
pub fn write_reference(distances: &[u32]) -> String {
    distances
        .iter()
        .enumerate()
        .map(|(node, &cost)| format!("{node}) cost:{}\n", Cost(cost)))
        .collect()
}
