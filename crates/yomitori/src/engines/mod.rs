//! OCR engine capability.
//!
//! Every OCR backend (Tesseract, EasyOCR, manga-ocr, a cloud service, a test
//! fixture) is reached through the [`OcrEngine`] trait. The consensus core only
//! ever sees the [`OcrResult`] values engines produce, so it can be exercised
//! with synthetic engines instead of real models.

#[cfg(feature = "tokio-runtime")]
pub mod runner;

#[cfg(feature = "tokio-runtime")]
pub use runner::run_engines;

use crate::Result;
use crate::types::{OcrResult, TextOrientation};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Known OCR engine families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineKind {
    /// Tesseract with the `jpn` / `jpn_vert` models
    #[serde(rename = "tesseract")]
    Tesseract,
    /// EasyOCR
    #[serde(rename = "easyocr")]
    EasyOcr,
    /// manga-ocr, tuned for vertical text in speech bubbles
    #[serde(rename = "manga_ocr")]
    MangaOcr,
    /// Any other backend
    #[serde(rename = "custom")]
    Custom,
}

impl EngineKind {
    /// Engines with a seeded default weight.
    pub const KNOWN: [EngineKind; 3] = [EngineKind::Tesseract, EngineKind::EasyOcr, EngineKind::MangaOcr];

    /// Canonical engine id, as used for weight lookups.
    pub fn id(&self) -> &'static str {
        match self {
            EngineKind::Tesseract => "tesseract",
            EngineKind::EasyOcr => "easyocr",
            EngineKind::MangaOcr => "manga_ocr",
            EngineKind::Custom => "custom",
        }
    }

    /// Trust weight before any feedback has been recorded.
    pub fn default_weight(&self) -> f64 {
        match self {
            EngineKind::MangaOcr => 1.2,
            EngineKind::Tesseract | EngineKind::EasyOcr | EngineKind::Custom => 1.0,
        }
    }

    /// Map an engine id to its family. Unrecognized ids are `Custom`.
    pub fn from_id(id: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|kind| kind.id() == id)
            .unwrap_or(EngineKind::Custom)
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// An OCR backend that reads one page image.
///
/// # Thread Safety
///
/// Engines must be `Send + Sync`; the runner calls every engine concurrently
/// from tokio tasks.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use std::path::Path;
/// use yomitori::engines::{OcrEngine, EngineKind, detect_orientation};
/// use yomitori::{OcrResult, Result, TextOrientation};
///
/// struct FixedEngine;
///
/// #[async_trait]
/// impl OcrEngine for FixedEngine {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     async fn extract(&self, _image: &Path, hint: Option<TextOrientation>) -> Result<OcrResult> {
///         let text = "こんにちは";
///         OcrResult::new(self.name(), text, 0.8, detect_orientation(text, hint))
///     }
/// }
///
/// assert_eq!(FixedEngine.kind(), EngineKind::Custom);
/// assert!(FixedEngine.supports_language("jpn"));
/// ```
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Unique engine id. Also the key for the engine's trust weight.
    fn name(&self) -> &str;

    /// Engine family. Defaults to the family matching [`name`](Self::name).
    fn kind(&self) -> EngineKind {
        EngineKind::from_id(self.name())
    }

    /// Recognize the text in the image at `image`.
    ///
    /// `orientation_hint`, when given, should be trusted over the engine's
    /// own detection (see [`detect_orientation`]).
    ///
    /// # Errors
    ///
    /// Any error is treated as this engine failing on this page; the runner
    /// logs it and continues with the other engines.
    async fn extract(&self, image: &Path, orientation_hint: Option<TextOrientation>) -> Result<OcrResult>;

    /// Whether the engine can read `lang`. Defaults to every language.
    fn supports_language(&self, _lang: &str) -> bool {
        true
    }
}

/// Orientation of recognized text, unless the caller already knows it.
///
/// Without a hint, text with more than one line break per twenty characters is
/// taken as vertical: vertical OCR output tends to emit one short column per
/// line.
pub fn detect_orientation(text: &str, orientation_hint: Option<TextOrientation>) -> TextOrientation {
    if let Some(hint) = orientation_hint {
        return hint;
    }

    let chars = text.chars().count();
    let newlines = text.chars().filter(|&c| c == '\n').count();
    if newlines as f64 > chars as f64 / 20.0 {
        TextOrientation::Vertical
    } else {
        TextOrientation::Horizontal
    }
}
