//! Selection strategies and orientation voting.
//!
//! Each strategy turns a candidate list into one score per candidate; the
//! winner is the highest score, with the earliest candidate kept on exact ties.

use super::weights::{DEFAULT_WEIGHT, WeightMap};
use crate::text::SimilarityMatrix;
use crate::types::{OcrResult, SelectionStrategy, TextOrientation};

const LEARNED_CONFIDENCE_SHARE: f64 = 0.3;
const LEARNED_WEIGHT_SHARE: f64 = 0.7;

fn weight_of(weights: &WeightMap, engine: &str) -> f64 {
    weights.get(engine).copied().unwrap_or(DEFAULT_WEIGHT)
}

/// Per-candidate scores for `strategy`, in input order.
///
/// `similarities` must have been computed over the texts of `results` in the
/// same order; only the agreement vote reads it.
pub fn strategy_scores(
    results: &[OcrResult],
    strategy: SelectionStrategy,
    weights: &WeightMap,
    similarities: &SimilarityMatrix,
) -> Vec<f64> {
    match strategy {
        SelectionStrategy::ConfidenceWeighted => results
            .iter()
            .map(|result| result.confidence() * weight_of(weights, result.engine()))
            .collect(),
        SelectionStrategy::MajorityVote => (0..results.len()).map(|i| similarities.mean_to_others(i)).collect(),
        SelectionStrategy::Learned => results
            .iter()
            .map(|result| {
                result.confidence() * LEARNED_CONFIDENCE_SHARE
                    + weight_of(weights, result.engine()) * LEARNED_WEIGHT_SHARE
            })
            .collect(),
    }
}

/// Index of the highest score. The incumbent is only replaced by a strictly
/// greater score, so the first maximal entry wins.
pub fn best_index(scores: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &score) in scores.iter().enumerate() {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
}

/// Most frequent orientation among `results`.
///
/// Ties go to the orientation that appears first in input order. Returns
/// `None` for an empty slice.
pub fn resolve_orientation(results: &[OcrResult]) -> Option<TextOrientation> {
    let mut counts: Vec<(TextOrientation, usize)> = Vec::with_capacity(3);
    for result in results {
        match counts.iter_mut().find(|(orientation, _)| *orientation == result.orientation()) {
            Some((_, count)) => *count += 1,
            None => counts.push((result.orientation(), 1)),
        }
    }

    let mut best: Option<(TextOrientation, usize)> = None;
    for (orientation, count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((orientation, count)),
        }
    }
    best.map(|(orientation, _)| orientation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(engine: &str, text: &str, confidence: f64, orientation: TextOrientation) -> OcrResult {
        OcrResult::new(engine, text, confidence, orientation).unwrap()
    }

    fn weights(entries: &[(&str, f64)]) -> WeightMap {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_best_index_first_wins_ties() {
        assert_eq!(best_index(&[]), None);
        assert_eq!(best_index(&[0.5]), Some(0));
        assert_eq!(best_index(&[0.5, 0.5, 0.5]), Some(0));
        assert_eq!(best_index(&[0.1, 0.7, 0.7]), Some(1));
        assert_eq!(best_index(&[0.0, 0.0, 0.3]), Some(2));
    }

    #[test]
    fn test_confidence_weighted_scores() {
        let results = vec![
            result("a", "x", 0.9, TextOrientation::Horizontal),
            result("b", "y", 0.5, TextOrientation::Horizontal),
        ];
        let weights = weights(&[("a", 1.0), ("b", 1.2)]);
        let matrix = SimilarityMatrix::compute(&["x", "y"]);

        let scores = strategy_scores(&results, SelectionStrategy::ConfidenceWeighted, &weights, &matrix);
        assert!((scores[0] - 0.9).abs() < 1e-12);
        assert!((scores[1] - 0.6).abs() < 1e-12);
        assert_eq!(best_index(&scores), Some(0));
    }

    #[test]
    fn test_learned_scores_favour_weight() {
        let results = vec![
            result("a", "x", 0.9, TextOrientation::Horizontal),
            result("b", "y", 0.5, TextOrientation::Horizontal),
        ];
        let weights = weights(&[("a", 1.0), ("b", 1.2)]);
        let matrix = SimilarityMatrix::compute(&["x", "y"]);

        let scores = strategy_scores(&results, SelectionStrategy::Learned, &weights, &matrix);
        // 0.27 + 0.70 vs 0.15 + 0.84
        assert!((scores[0] - 0.97).abs() < 1e-12);
        assert!((scores[1] - 0.99).abs() < 1e-12);
        assert_eq!(best_index(&scores), Some(1));
    }

    #[test]
    fn test_unseen_engine_uses_default_weight() {
        let results = vec![result("new-engine", "x", 0.4, TextOrientation::Horizontal)];
        let matrix = SimilarityMatrix::compute(&["x"]);
        let scores = strategy_scores(&results, SelectionStrategy::ConfidenceWeighted, &WeightMap::new(), &matrix);
        assert!((scores[0] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_majority_vote_scores() {
        let texts = ["東京都", "東京都", "東京部"];
        let results: Vec<_> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| result(&format!("e{}", i), t, 0.5, TextOrientation::Horizontal))
            .collect();
        let matrix = SimilarityMatrix::compute(&texts);

        let scores = strategy_scores(&results, SelectionStrategy::MajorityVote, &WeightMap::new(), &matrix);
        assert!(scores[0] > scores[2]);
        assert_eq!(scores[0], scores[1]);
        assert_eq!(best_index(&scores), Some(0));
    }

    #[test]
    fn test_resolve_orientation_majority() {
        let results = vec![
            result("a", "", 0.5, TextOrientation::Vertical),
            result("b", "", 0.5, TextOrientation::Horizontal),
            result("c", "", 0.5, TextOrientation::Vertical),
        ];
        assert_eq!(resolve_orientation(&results), Some(TextOrientation::Vertical));
    }

    #[test]
    fn test_resolve_orientation_tie_goes_to_first_seen() {
        let results = vec![
            result("a", "", 0.5, TextOrientation::Mixed),
            result("b", "", 0.5, TextOrientation::Horizontal),
            result("c", "", 0.5, TextOrientation::Horizontal),
            result("d", "", 0.5, TextOrientation::Mixed),
        ];
        assert_eq!(resolve_orientation(&results), Some(TextOrientation::Mixed));
    }

    #[test]
    fn test_resolve_orientation_empty() {
        assert_eq!(resolve_orientation(&[]), None);
    }
}
