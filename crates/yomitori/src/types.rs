//! Core data types: per-engine OCR results and the consensus record.

use crate::{Result, YomitoriError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Opaque per-result metadata. Never interpreted by the consensus core.
pub type Metadata = HashMap<String, serde_json::Value>;

/// Layout classification of recognized text.
///
/// Japanese text is commonly set vertically (tategaki) in novels and manga and
/// horizontally (yokogaki) elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOrientation {
    Horizontal,
    Vertical,
    Mixed,
}

impl TextOrientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextOrientation::Horizontal => "horizontal",
            TextOrientation::Vertical => "vertical",
            TextOrientation::Mixed => "mixed",
        }
    }
}

impl fmt::Display for TextOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextOrientation {
    type Err = YomitoriError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Ok(TextOrientation::Horizontal),
            "vertical" => Ok(TextOrientation::Vertical),
            "mixed" => Ok(TextOrientation::Mixed),
            other => Err(YomitoriError::invalid_input(format!("unknown orientation: {}", other))),
        }
    }
}

/// Human review state of a consensus record.
///
/// The consensus core only ever produces `Pending`; the other states belong to
/// the review step that runs after selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    #[default]
    Pending,
    Validated,
    Corrected,
    Rejected,
}

/// Policy used to pick the winning engine output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// `confidence * weight(engine)`, highest wins.
    #[default]
    ConfidenceWeighted,
    /// Highest mean text similarity to every other result (agreement vote).
    MajorityVote,
    /// `confidence * 0.3 + weight(engine) * 0.7`, favouring learned trust.
    Learned,
}

impl SelectionStrategy {
    pub const ALL: [SelectionStrategy; 3] = [
        SelectionStrategy::ConfidenceWeighted,
        SelectionStrategy::MajorityVote,
        SelectionStrategy::Learned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionStrategy::ConfidenceWeighted => "confidence_weighted",
            SelectionStrategy::MajorityVote => "majority_vote",
            SelectionStrategy::Learned => "learned",
        }
    }
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionStrategy {
    type Err = YomitoriError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "confidence_weighted" => Ok(SelectionStrategy::ConfidenceWeighted),
            "majority_vote" => Ok(SelectionStrategy::MajorityVote),
            "learned" => Ok(SelectionStrategy::Learned),
            other => Err(YomitoriError::invalid_input(format!("unknown strategy: {}", other))),
        }
    }
}

/// Raw OCR output from a single engine.
///
/// Constructed through [`OcrResult::new`], which enforces the invariants:
/// non-empty engine id, confidence in `[0, 1]` and a non-negative processing
/// time. Deserialization goes through the same checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OcrResultRepr")]
pub struct OcrResult {
    engine: String,
    text: String,
    confidence: f64,
    orientation: TextOrientation,
    processing_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounding_boxes: Option<Vec<serde_json::Value>>,
    metadata: Metadata,
}

#[derive(Deserialize)]
struct OcrResultRepr {
    engine: String,
    text: String,
    confidence: f64,
    orientation: TextOrientation,
    #[serde(default)]
    processing_time: f64,
    #[serde(default)]
    bounding_boxes: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    metadata: Metadata,
}

impl TryFrom<OcrResultRepr> for OcrResult {
    type Error = YomitoriError;

    fn try_from(repr: OcrResultRepr) -> Result<Self> {
        let mut result = OcrResult::new(repr.engine, repr.text, repr.confidence, repr.orientation)?
            .with_processing_time(repr.processing_time)?
            .with_metadata(repr.metadata);
        result.bounding_boxes = repr.bounding_boxes;
        Ok(result)
    }
}

impl OcrResult {
    /// Create a validated OCR result.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `engine` is empty or `confidence` is outside `[0, 1]`
    /// (NaN included).
    pub fn new(
        engine: impl Into<String>,
        text: impl Into<String>,
        confidence: f64,
        orientation: TextOrientation,
    ) -> Result<Self> {
        let engine = engine.into();
        if engine.trim().is_empty() {
            return Err(YomitoriError::invalid_input("OCR result engine id cannot be empty"));
        }

        if !(0.0..=1.0).contains(&confidence) {
            return Err(YomitoriError::invalid_input(format!(
                "confidence for engine '{}' must be within [0, 1], got {}",
                engine, confidence
            )));
        }

        Ok(Self {
            engine,
            text: text.into(),
            confidence,
            orientation,
            processing_time: 0.0,
            bounding_boxes: None,
            metadata: Metadata::new(),
        })
    }

    /// Attach the wall-clock processing time in seconds.
    pub fn with_processing_time(mut self, seconds: f64) -> Result<Self> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(YomitoriError::invalid_input(format!(
                "processing time for engine '{}' must be a non-negative number, got {}",
                self.engine, seconds
            )));
        }
        self.processing_time = seconds;
        Ok(self)
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_bounding_boxes(mut self, boxes: Vec<serde_json::Value>) -> Self {
        self.bounding_boxes = Some(boxes);
        self
    }

    pub fn engine(&self) -> &str {
        &self.engine
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn orientation(&self) -> TextOrientation {
        self.orientation
    }

    pub fn processing_time(&self) -> f64 {
        self.processing_time
    }

    pub fn bounding_boxes(&self) -> Option<&[serde_json::Value]> {
        self.bounding_boxes.as_deref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// Merged result from multiple OCR engines.
///
/// `selected_text` is the payload handed to segmentation and translation;
/// every other field exists for audit, review and feedback wiring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConsensus {
    pub selected_text: String,
    pub selected_engine: String,
    /// Copy of every result the selection was made from.
    pub all_results: Vec<OcrResult>,
    /// Agreement across all results in `[0, 1]`. Not the winner's confidence.
    pub consensus_score: f64,
    pub orientation: TextOrientation,
    pub strategy: SelectionStrategy,

    #[serde(default)]
    pub validation_status: ValidationStatus,
    #[serde(default)]
    pub corrected_text: Option<String>,
    #[serde(default)]
    pub user_notes: Option<String>,
}
