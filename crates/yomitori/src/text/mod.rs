//! Text utilities for comparing and classifying OCR output.
//!
//! - [`similarity`] - Ratcliff/Obershelp agreement score between two strings
//! - [`SimilarityMatrix`] - all pairwise scores for one selection
//! - [`contains_japanese`] - script detection for text-layer checks

pub mod script;
pub mod similarity;

pub use script::{contains_japanese, is_japanese_char};
pub use similarity::{SimilarityMatrix, mean_pairwise_similarity, similarity};
