//! Error types for yomitori.
//!
//! All fallible operations return [`YomitoriError`]. Errors are built with
//! `thiserror` and keep their source chain via `#[source]`.
//!
//! # Error classes
//!
//! **Fatal to the current call:**
//! - `InvalidInput` - empty result lists, unknown strategies, malformed OCR results
//! - `AllEnginesFailed` - no engine produced a usable result for an input
//! - `Config` - configuration file missing or invalid
//!
//! **Warning class:**
//! - `Persistence` - the weight store could not be written. The in-memory
//!   weights are already updated; callers may log and continue.
//!
//! **System errors bubble up unchanged:**
//! - `Io` (from `std::io::Error`)
//!
//! # Example
//!
//! ```rust
//! use yomitori::{YomitoriError, Result};
//!
//! fn require_text(text: &str) -> Result<&str> {
//!     if text.is_empty() {
//!         return Err(YomitoriError::invalid_input("text is empty"));
//!     }
//!     Ok(text)
//! }
//!
//! assert!(require_text("").is_err());
//! ```
use thiserror::Error;

/// Result type alias using `YomitoriError`.
pub type Result<T> = std::result::Result<T, YomitoriError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for all yomitori operations.
#[derive(Debug, Error)]
pub enum YomitoriError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Persistence warning: {message}")]
    Persistence {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("OCR engine '{engine}' failed: {message}")]
    Engine { engine: String, message: String },

    #[error("All OCR engines failed for {0}")]
    AllEnginesFailed(String),
}

impl From<serde_json::Error> for YomitoriError {
    fn from(err: serde_json::Error) -> Self {
        YomitoriError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl YomitoriError {
    /// Create an `InvalidInput` error.
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
            source: None,
        }
    }

    /// Create an `InvalidInput` error with source.
    pub fn invalid_input_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::InvalidInput {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a `Persistence` error with source.
    pub fn persistence_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Persistence {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a `Config` error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a `Config` error with source.
    pub fn config_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an `Engine` error for the named engine.
    pub fn engine<E: Into<String>, S: Into<String>>(engine: E, message: S) -> Self {
        Self::Engine {
            engine: engine.into(),
            message: message.into(),
        }
    }

    /// Whether the error is a non-fatal warning.
    ///
    /// Only `Persistence` is: the operation that produced it has already taken
    /// effect in memory.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }
}
