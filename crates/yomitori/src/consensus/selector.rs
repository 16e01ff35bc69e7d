//! Consensus selection over multiple OCR engine outputs.

use super::strategy::{best_index, resolve_orientation, strategy_scores};
use super::weights::{EngineWeightStore, WeightMap};
use crate::core::config::ConsensusConfig;
use crate::text::SimilarityMatrix;
use crate::types::{OcrConsensus, OcrResult, SelectionStrategy, TextOrientation, ValidationStatus};
use crate::{Result, YomitoriError};
use std::path::PathBuf;

/// Pick the best OCR result under `strategy` using a fixed weight map.
///
/// This is the pure core of [`ConsensusSelector::select_best`]: the output
/// depends only on the arguments, and `results` is copied, never modified.
///
/// - One result is returned as-is, with its confidence as the consensus score.
/// - Two or more results are ranked by `strategy`; the consensus score is the
///   mean similarity over all pairs and the orientation is the majority vote.
///
/// # Errors
///
/// `InvalidInput` if `results` is empty.
pub fn select_best(results: &[OcrResult], strategy: SelectionStrategy, weights: &WeightMap) -> Result<OcrConsensus> {
    let Some(first) = results.first() else {
        return Err(YomitoriError::invalid_input("no OCR results provided"));
    };

    if results.len() == 1 {
        return Ok(OcrConsensus {
            selected_text: first.text().to_string(),
            selected_engine: first.engine().to_string(),
            all_results: results.to_vec(),
            consensus_score: first.confidence(),
            orientation: first.orientation(),
            strategy,
            validation_status: ValidationStatus::Pending,
            corrected_text: None,
            user_notes: None,
        });
    }

    let texts: Vec<&str> = results.iter().map(OcrResult::text).collect();
    let similarities = SimilarityMatrix::compute(&texts);

    let scores = strategy_scores(results, strategy, weights, &similarities);
    for (result, score) in results.iter().zip(&scores) {
        tracing::debug!(
            engine = result.engine(),
            confidence = result.confidence(),
            score,
            %strategy,
            "Scored OCR candidate"
        );
    }

    let selected = best_index(&scores)
        .and_then(|index| results.get(index))
        .ok_or_else(|| YomitoriError::invalid_input("no OCR results provided"))?;
    let orientation = resolve_orientation(results).unwrap_or(first.orientation());
    let consensus_score = similarities.mean_pairwise();

    tracing::debug!(
        selected_engine = selected.engine(),
        consensus_score,
        %orientation,
        candidates = results.len(),
        "Selected OCR consensus"
    );

    Ok(OcrConsensus {
        selected_text: selected.text().to_string(),
        selected_engine: selected.engine().to_string(),
        all_results: results.to_vec(),
        consensus_score,
        orientation,
        strategy,
        validation_status: ValidationStatus::Pending,
        corrected_text: None,
        user_notes: None,
    })
}

/// Chooses one transcription from several OCR engines and learns which
/// engines to trust from review feedback.
///
/// # Thread Safety
///
/// `ConsensusSelector` is `Send + Sync`. Selection reads a copy of the weights,
/// so it can run from many threads while feedback is being recorded.
///
/// # Example
///
/// ```rust
/// use yomitori::{ConsensusSelector, OcrResult, SelectionStrategy, TextOrientation};
///
/// # fn main() -> yomitori::Result<()> {
/// let selector = ConsensusSelector::in_memory();
/// let results = vec![
///     OcrResult::new("tesseract", "吾輩は猫である", 0.82, TextOrientation::Vertical)?,
///     OcrResult::new("manga_ocr", "吾輩は猫である", 0.91, TextOrientation::Vertical)?,
///     OcrResult::new("easyocr", "吾輩は描である", 0.64, TextOrientation::Horizontal)?,
/// ];
///
/// let consensus = selector.select_best(&results, SelectionStrategy::ConfidenceWeighted)?;
/// assert_eq!(consensus.selected_engine, "manga_ocr");
/// assert_eq!(consensus.orientation, TextOrientation::Vertical);
///
/// // A reviewer confirmed the transcription.
/// selector.record_feedback(&consensus.selected_engine, true)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConsensusSelector {
    store: EngineWeightStore,
    default_strategy: SelectionStrategy,
    orientation_hint: Option<TextOrientation>,
}

impl ConsensusSelector {
    /// Build a selector on top of an existing weight store.
    pub fn new(store: EngineWeightStore) -> Self {
        Self {
            store,
            default_strategy: SelectionStrategy::default(),
            orientation_hint: None,
        }
    }

    /// Selector whose weights are loaded from, and saved to, `weights_path`.
    pub fn open(weights_path: impl Into<PathBuf>) -> Self {
        Self::new(EngineWeightStore::open(weights_path))
    }

    /// Selector with default weights and no persistence.
    pub fn in_memory() -> Self {
        Self::new(EngineWeightStore::in_memory())
    }

    /// Selector configured from a [`ConsensusConfig`].
    pub fn from_config(config: &ConsensusConfig) -> Self {
        let store = if config.persist_weights {
            EngineWeightStore::open(config.weights_path.clone())
        } else {
            EngineWeightStore::in_memory()
        };
        Self::new(store)
            .with_default_strategy(config.strategy)
            .with_orientation_hint(config.orientation_hint)
    }

    pub fn with_default_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.default_strategy = strategy;
        self
    }

    pub fn default_strategy(&self) -> SelectionStrategy {
        self.default_strategy
    }

    /// Orientation passed to engines when the caller gives none.
    pub fn with_orientation_hint(mut self, hint: Option<TextOrientation>) -> Self {
        self.orientation_hint = hint;
        self
    }

    pub fn orientation_hint(&self) -> Option<TextOrientation> {
        self.orientation_hint
    }

    pub fn weight_store(&self) -> &EngineWeightStore {
        &self.store
    }

    /// Current trust weight for `engine`.
    pub fn weight(&self, engine: &str) -> f64 {
        self.store.get(engine)
    }

    /// Copy of every known engine weight.
    pub fn weights(&self) -> WeightMap {
        self.store.snapshot()
    }

    /// Choose the best result under `strategy`. See [`select_best`].
    ///
    /// Reads one snapshot of the weights; never modifies them.
    pub fn select_best(&self, results: &[OcrResult], strategy: SelectionStrategy) -> Result<OcrConsensus> {
        let weights = self.store.snapshot();
        select_best(results, strategy, &weights)
    }

    /// [`select_best`](Self::select_best) with the configured default strategy.
    pub fn select_best_default(&self, results: &[OcrResult]) -> Result<OcrConsensus> {
        self.select_best(results, self.default_strategy)
    }

    /// Reward or penalize `engine` and persist the new weights.
    ///
    /// Returns the engine's updated weight.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `engine` is empty (nothing is changed).
    /// - `Persistence` if the weights could not be saved. This is a warning:
    ///   the new weight is already in effect for subsequent selections.
    pub fn record_feedback(&self, engine: &str, was_correct: bool) -> Result<f64> {
        if engine.trim().is_empty() {
            return Err(YomitoriError::invalid_input("feedback engine id cannot be empty"));
        }

        match self.store.adjust_and_persist(engine, was_correct) {
            Ok(weight) => {
                tracing::info!(engine, was_correct, weight, "Recorded OCR engine feedback");
                Ok(weight)
            }
            Err(e) => {
                tracing::warn!(
                    engine,
                    was_correct,
                    weight = self.store.get(engine),
                    "Engine feedback applied in memory but not persisted: {}",
                    e
                );
                Err(e)
            }
        }
    }
}

impl Default for ConsensusSelector {
    fn default() -> Self {
        Self::in_memory()
    }
}
