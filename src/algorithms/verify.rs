//! Result verification against reference distances

use crate::error::{BenchError, Result};

/// A node whose computed distance differs from the reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    /// Node index
    pub node: usize,
    /// Reference distance
    pub expected: u32,
    /// Computed distance
    pub actual: u32,
}

impl From<Mismatch> for BenchError {
    fn from(m: Mismatch) -> Self {
        Self::ResultMismatch {
            node: m.node,
            expected: m.expected,
            actual: m.actual,
        }
    }
}

fn check_lengths(computed: &[u32], reference: &[u32]) -> Result<()> {
    if computed.len() == reference.len() {
        Ok(())
    } else {
        Err(BenchError::malformed(format!(
            "reference has {} records but the graph has {} nodes",
            reference.len(),
            computed.len()
        )))
    }
}

/// Compare computed distances element-wise against the reference
///
/// Both sides must use [`crate::UNREACHED`] for unreached nodes.
///
/// # Errors
///
/// - `MalformedInput` if the arrays differ in length
/// - `ResultMismatch` for the first diverging node
pub fn verify_distances(computed: &[u32], reference: &[u32]) -> Result<()> {
    check_lengths(computed, reference)?;
    match find_mismatches(computed, reference).into_iter().next() {
        Some(first) => Err(first.into()),
        None => Ok(()),
    }
}

/// Every diverging node, in index order
///
/// Only the overlapping prefix is compared when lengths differ.
#[must_use]
pub fn find_mismatches(computed: &[u32], reference: &[u32]) -> Vec<Mismatch> {
    computed
        .iter()
        .zip(reference)
        .enumerate()
        .filter(|(_, (actual, expected))| actual != expected)
        .map(|(node, (&actual, &expected))| Mismatch {
            node,
            expected,
            actual,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UNREACHED;

    #[test]
    fn test_matching_distances() {
        assert!(verify_distances(&[0, 1, 1, 2], &[0, 1, 1, 2]).is_ok());
        assert!(verify_distances(&[0, UNREACHED], &[0, UNREACHED]).is_ok());
    }

    #[test]
    fn test_reports_first_divergence() {
        let err = verify_distances(&[0, 1, 3, 5], &[0, 1, 2, 2]).unwrap_err();
        assert!(matches!(
            err,
            BenchError::ResultMismatch {
                node: 2,
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_collects_all_divergences() {
        let mismatches = find_mismatches(&[0, 1, 3, 5], &[0, 1, 2, 2]);
        assert_eq!(mismatches.len(), 2);
        assert_eq!(mismatches[1].node, 3);
    }

    #[test]
    fn test_sentinel_must_agree() {
        let err = verify_distances(&[0, UNREACHED], &[0, 7]).unwrap_err();
        assert!(err.is_result_mismatch());
    }

    #[test]
    fn test_length_mismatch_is_malformed() {
        let err = verify_distances(&[0, 1], &[0]).unwrap_err();
        assert!(matches!(err, BenchError::MalformedInput(_)));
    }

    #[test]
    fn test_verification_is_idempotent() {
        let computed = [0, 1, 9];
        let reference = [0, 1, 2];
        let first = verify_distances(&computed, &reference).is_ok();
        let second = verify_distances(&computed, &reference).is_ok();
        assert_eq!(first, second);
        assert_eq!(
            find_mismatches(&computed, &reference),
            find_mismatches(&computed, &reference)
        );
    }
}
