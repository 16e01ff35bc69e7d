//! yomitori - Multi-Engine OCR Consensus for Japanese Text
//!
//! yomitori sits between a set of OCR engines and the text pipeline that turns
//! scanned Japanese pages into study flashcards. Each engine reads the same
//! page; yomitori reconciles their guesses into one transcription with an
//! agreement score and learns from reviewer feedback which engines to trust.
//!
//! # Quick Start
//!
//! ```rust
//! use yomitori::{ConsensusSelector, OcrResult, SelectionStrategy, TextOrientation};
//!
//! # fn main() -> yomitori::Result<()> {
//! let selector = ConsensusSelector::in_memory();
//! let results = vec![
//!     OcrResult::new("tesseract", "本を読む", 0.71, TextOrientation::Horizontal)?,
//!     OcrResult::new("easyocr", "本を読む", 0.65, TextOrientation::Horizontal)?,
//! ];
//!
//! let consensus = selector.select_best(&results, SelectionStrategy::MajorityVote)?;
//! assert_eq!(consensus.selected_text, "本を読む");
//! assert_eq!(consensus.consensus_score, 1.0);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Text** (`text`): Ratcliff/Obershelp similarity and script detection
//! - **Consensus** (`consensus`): strategy dispatch, orientation vote, engine
//!   weight store and the feedback loop
//! - **Engines** (`engines`): the `OcrEngine` capability and the concurrent runner
//! - **Pipeline** (`pipeline`): run every engine on a page, then select
//! - **Core** (`core`): configuration loading

#![deny(unsafe_code)]

pub mod consensus;
pub mod core;
pub mod engines;
pub mod error;
pub mod text;
pub mod types;

#[cfg(feature = "tokio-runtime")]
pub mod pipeline;

pub use error::{Result, YomitoriError};
pub use types::*;

pub use consensus::{ConsensusSelector, EngineWeightStore, WeightMap, select_best};
pub use crate::core::config::ConsensusConfig;
pub use engines::{EngineKind, OcrEngine, detect_orientation};
pub use text::{contains_japanese, similarity};

#[cfg(feature = "tokio-runtime")]
pub use engines::run_engines;

#[cfg(feature = "tokio-runtime")]
pub use pipeline::recognize_page;
