//! Distance computation and ranking for embeddings.
//!
//! The chunk index ranks by squared Euclidean distance (smaller is closer),
//! so the helpers here use the same metric.

use ordered_float::OrderedFloat;

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// Compute the squared Euclidean distance between two embeddings.
///
/// The square root is never taken: ordering by squared distance is identical
/// to ordering by distance and avoids the extra work.
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    Ok(a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum())
}

/// A candidate ranked by distance to a query.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    /// Index of the candidate in the input slice.
    pub index: usize,

    /// Squared Euclidean distance to the query.
    pub distance: f32,
}

/// Rank candidates by ascending squared Euclidean distance to the query.
///
/// Returns at most `k` candidates. Ties break on the candidate's input
/// position, so ranking is deterministic.
pub fn rank_top_k(
    query: &[f32],
    candidates: &[Embedding],
    k: usize,
) -> Result<Vec<RankedCandidate>> {
    let mut scored: Vec<(OrderedFloat<f32>, usize)> = Vec::with_capacity(candidates.len());

    for (index, embedding) in candidates.iter().enumerate() {
        let distance = squared_euclidean(query, embedding)?;
        scored.push((OrderedFloat(distance), index));
    }

    // Sort by distance ascending; tuple ordering breaks ties by index.
    scored.sort();

    let results: Vec<RankedCandidate> = scored
        .into_iter()
        .take(k)
        .map(|(distance, index)| RankedCandidate {
            index,
            distance: distance.0,
        })
        .collect();

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_squared_euclidean_identical() {
        let a = vec![1.0, 2.0, 3.0];
        let d = squared_euclidean(&a, &a).unwrap();
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn test_squared_euclidean_known_value() {
        let a = vec![0.0, 0.0];
        let b = vec![3.0, 4.0];
        let d = squared_euclidean(&a, &b).unwrap();
        assert!((d - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = vec![1.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!(squared_euclidean(&a, &b).is_err());
    }

    #[test]
    fn test_rank_top_k_orders_by_distance() {
        let query = vec![0.0, 0.0];
        let candidates = vec![
            vec![3.0, 0.0], // distance 9
            vec![1.0, 0.0], // distance 1
            vec![2.0, 0.0], // distance 4
        ];

        let ranked = rank_top_k(&query, &candidates, 2).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].index, 1);
        assert_eq!(ranked[1].index, 2);
    }

    #[test]
    fn test_rank_top_k_fewer_candidates_than_k() {
        let query = vec![0.0];
        let candidates = vec![vec![1.0], vec![2.0]];

        let ranked = rank_top_k(&query, &candidates, 10).unwrap();
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_rank_top_k_tie_breaks_on_position() {
        let query = vec![0.0];
        let candidates = vec![vec![1.0], vec![-1.0], vec![1.0]];

        let ranked = rank_top_k(&query, &candidates, 3).unwrap();
        assert_eq!(
            ranked.iter().map(|c| c.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }
}
