//! Graph loader for the line-oriented benchmark graph format
//!
//! # Format
//!
//! ```text
//! 4            <- node_count
//! 0 2          <- "<edge_start> <edge_degree>", one line per node
//! 2 1
//! 3 0
//! 3 0
//!
//! 0            <- source (recorded, never used as the traversal source)
//!
//! 3            <- edge_count
//! 1 1          <- "<destination> [ignored...]", one line per edge
//! 2 1
//! 3 1
//! ```
//!
//! Blank lines are skipped anywhere and tokens may be separated by any mix of
//! spaces, tabs and carriage returns.

use super::graph::BfsGraph;
use crate::error::{BenchError, Result};
use std::path::Path;

/// Upper bound on speculative preallocation from a declared count
const MAX_PREALLOC: usize = 1 << 20;

/// A parsed graph file
#[derive(Debug, Clone)]
pub struct GraphFile {
    /// The graph topology
    pub graph: BfsGraph,

    /// Source node named by the file (informational only)
    pub declared_source: u32,
}

/// Cursor over the non-blank lines of the input
struct Records<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Records<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
        }
    }

    /// Next non-blank line as (1-based line number, tokens)
    fn next_record(&mut self) -> Option<(usize, std::str::SplitWhitespace<'a>)> {
        self.lines.by_ref().find_map(|(idx, line)| {
            let trimmed = line.trim();
            (!trimmed.is_empty()).then(|| (idx + 1, trimmed.split_whitespace()))
        })
    }

    fn expect_record(
        &mut self,
        what: &str,
    ) -> Result<(usize, std::str::SplitWhitespace<'a>)> {
        self.next_record()
            .ok_or_else(|| BenchError::malformed(format!("unexpected end of input, expected {what}")))
    }

    fn next_u32(&mut self, what: &str) -> Result<u32> {
        let (line, mut tokens) = self.expect_record(what)?;
        parse_u32(tokens.next(), line, what)
    }
}

fn parse_u32(token: Option<&str>, line: usize, what: &str) -> Result<u32> {
    let token =
        token.ok_or_else(|| BenchError::malformed(format!("line {line}: missing {what}")))?;
    token.parse::<u32>().map_err(|_| {
        BenchError::malformed(format!("line {line}: {what} {token:?} is not a valid u32"))
    })
}

/// Parse a graph from its textual description
///
/// # Errors
///
/// Returns `MalformedInput` if a numeric field does not parse, the input ends
/// before a declared count is satisfied, or the resulting CSR arrays are
/// inconsistent (edge ranges overrun, destinations out of range).
///
/// # Example
///
/// ```
/// use hybris::storage::parse_graph;
///
/// let file = parse_graph("2\n0 1\n1 0\n\n0\n\n1\n1 1\n").unwrap();
/// assert_eq!(file.graph.num_nodes(), 2);
/// assert_eq!(file.graph.edges(), &[1]);
/// ```
pub fn parse_graph(text: &str) -> Result<GraphFile> {
    let mut records = Records::new(text);

    let node_count = records.next_u32("node count")? as usize;
    let mut edge_start = Vec::with_capacity(node_count.min(MAX_PREALLOC));
    let mut edge_degree = Vec::with_capacity(node_count.min(MAX_PREALLOC));

    for node in 0..node_count {
        let (line, mut tokens) = records.next_record().ok_or_else(|| {
            BenchError::malformed(format!(
                "declared {node_count} nodes but input ends after {node} node records"
            ))
        })?;
        edge_start.push(parse_u32(tokens.next(), line, "edge start")?);
        edge_degree.push(parse_u32(tokens.next(), line, "edge degree")?);
    }

    let declared_source = records.next_u32("source node")?;

    let edge_count = records.next_u32("edge count")? as usize;
    let mut edges = Vec::with_capacity(edge_count.min(MAX_PREALLOC));

    for edge in 0..edge_count {
        let (line, mut tokens) = records.next_record().ok_or_else(|| {
            BenchError::malformed(format!(
                "declared {edge_count} edges but input ends after {edge} edge records"
            ))
        })?;
        edges.push(parse_u32(tokens.next(), line, "edge destination")?);
    }

    let graph = BfsGraph::from_parts(edge_start, edge_degree, edges)?;
    log::debug!(
        "Parsed graph: {} nodes, {} edges (declared source {declared_source})",
        graph.num_nodes(),
        graph.num_edges()
    );

    Ok(GraphFile {
        graph,
        declared_source,
    })
}

/// Read and parse a graph file
///
/// # Errors
///
/// Returns `Io` if the file cannot be read, otherwise as [`parse_graph`]
pub async fn load_graph(path: impl AsRef<Path>) -> Result<GraphFile> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| BenchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_graph(&text)
}
