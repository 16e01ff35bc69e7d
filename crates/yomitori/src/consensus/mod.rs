//! Multi-engine OCR consensus.
//!
//! Several OCR engines read the same page and disagree in small ways. This
//! module reconciles them:
//!
//! - [`select_best`] / [`ConsensusSelector`] - pick one transcription per
//!   [`SelectionStrategy`](crate::SelectionStrategy), score the overall
//!   agreement and vote on orientation
//! - [`EngineWeightStore`] - persisted per-engine trust weights
//! - [`ConsensusSelector::record_feedback`] - the learning loop: reviewer
//!   verdicts nudge an engine's weight up or down by 5%
//!
//! The weight update is a plain multiplicative heuristic clamped to
//! `[0.1, 2.0]`. It has no decay and carries no statistical guarantee.

pub mod selector;
pub mod strategy;
pub mod weights;

pub use selector::{ConsensusSelector, select_best};
pub use strategy::{best_index, resolve_orientation, strategy_scores};
pub use weights::{
    DEFAULT_WEIGHT, EngineWeightStore, MAX_WEIGHT, MIN_WEIGHT, WeightMap, default_weights, load_weights,
};
