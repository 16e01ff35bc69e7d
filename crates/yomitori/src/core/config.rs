//! Configuration loading and management.
//!
//! [`ConsensusConfig`] can be loaded from TOML, YAML or JSON, discovered as a
//! `yomitori.toml` in the project hierarchy, or built programmatically.

use crate::types::{SelectionStrategy, TextOrientation};
use crate::{Result, YomitoriError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name searched for by [`ConsensusConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "yomitori.toml";

/// Consensus configuration.
///
/// # Example
///
/// ```rust
/// use yomitori::core::config::ConsensusConfig;
/// use yomitori::SelectionStrategy;
///
/// let config = ConsensusConfig::default();
/// assert_eq!(config.strategy, SelectionStrategy::ConfidenceWeighted);
/// assert!(config.persist_weights);
///
/// // let config = ConsensusConfig::from_toml_file("yomitori.toml")?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Location of the engine weight file
    #[serde(default = "default_weights_path")]
    pub weights_path: PathBuf,

    /// Save weights after every feedback event (false = in-memory only)
    #[serde(default = "default_true")]
    pub persist_weights: bool,

    /// Strategy used by `select_best_default`
    #[serde(default)]
    pub strategy: SelectionStrategy,

    /// Orientation passed to engines as a hint (None = let engines detect)
    #[serde(default)]
    pub orientation_hint: Option<TextOrientation>,
}

fn default_weights_path() -> PathBuf {
    PathBuf::from(".yomitori").join("engine_weights.json")
}

fn default_true() -> bool {
    true
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            weights_path: default_weights_path(),
            persist_weights: true,
            strategy: SelectionStrategy::default(),
            orientation_hint: None,
        }
    }
}

impl ConsensusConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `YomitoriError::Config` if the file can't be read or is invalid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = read_config(path)?;

        toml::from_str(&content)
            .map_err(|e| YomitoriError::config_with_source(format!("Invalid TOML in {}", path.display()), e))
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = read_config(path)?;

        serde_yaml_ng::from_str(&content)
            .map_err(|e| YomitoriError::config_with_source(format!("Invalid YAML in {}", path.display()), e))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = read_config(path)?;

        serde_json::from_str(&content)
            .map_err(|e| YomitoriError::config_with_source(format!("Invalid JSON in {}", path.display()), e))
    }

    /// Load configuration, picking the format from the file extension.
    ///
    /// `.toml`, `.yaml`/`.yml` and `.json` are supported.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "toml" => Self::from_toml_file(path),
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            _ => Err(YomitoriError::config(format!(
                "Unsupported config file extension for {} (expected toml, yaml or json)",
                path.display()
            ))),
        }
    }

    /// Discover configuration file in parent directories.
    ///
    /// Searches for `yomitori.toml` in the current directory and its parents.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(YomitoriError::Io)?;

        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                tracing::debug!("Using configuration from {}", candidate.display());
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| YomitoriError::config_with_source(format!("Failed to read config file {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = ConsensusConfig::default();
        assert!(config.persist_weights);
        assert_eq!(config.strategy, SelectionStrategy::ConfidenceWeighted);
        assert_eq!(config.weights_path, PathBuf::from(".yomitori/engine_weights.json"));
        assert!(config.orientation_hint.is_none());
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("yomitori.toml");

        fs::write(
            &config_path,
            r#"
weights_path = "data/weights.json"
strategy = "majority_vote"
orientation_hint = "vertical"
        "#,
        )
        .unwrap();

        let config = ConsensusConfig::from_toml_file(&config_path).unwrap();
        assert_eq!(config.weights_path, PathBuf::from("data/weights.json"));
        assert_eq!(config.strategy, SelectionStrategy::MajorityVote);
        assert_eq!(config.orientation_hint, Some(TextOrientation::Vertical));
        assert!(config.persist_weights);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("yomitori.toml");
        fs::write(&config_path, "").unwrap();

        let config = ConsensusConfig::from_toml_file(&config_path).unwrap();
        assert_eq!(config, ConsensusConfig::default());
    }

    #[test]
    fn test_unknown_strategy_is_config_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("yomitori.toml");
        fs::write(&config_path, "strategy = \"ensemble\"\n").unwrap();

        let err = ConsensusConfig::from_toml_file(&config_path).unwrap_err();
        assert!(matches!(err, YomitoriError::Config { .. }));
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("yomitori.yaml");
        fs::write(&config_path, "strategy: learned\npersist_weights: false\n").unwrap();

        let config = ConsensusConfig::from_file(&config_path).unwrap();
        assert_eq!(config.strategy, SelectionStrategy::Learned);
        assert!(!config.persist_weights);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("yomitori.json");
        fs::write(&config_path, r#"{"orientation_hint": "mixed"}"#).unwrap();

        let config = ConsensusConfig::from_file(&config_path).unwrap();
        assert_eq!(config.orientation_hint, Some(TextOrientation::Mixed));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = ConsensusConfig::from_toml_file("/nonexistent/yomitori.toml").unwrap_err();
        assert!(matches!(err, YomitoriError::Config { .. }));
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = ConsensusConfig::from_file("settings.ini").unwrap_err();
        assert!(matches!(err, YomitoriError::Config { .. }));
    }

    #[test]
    #[serial]
    fn test_discover_yomitori_toml() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("books").join("vol1");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "strategy = \"learned\"\n").unwrap();

        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&nested).unwrap();

        let result = std::panic::catch_unwind(|| {
            let config = ConsensusConfig::discover().unwrap();
            assert_eq!(config.unwrap().strategy, SelectionStrategy::Learned);
        });

        std::env::set_current_dir(&original_dir).unwrap();

        if let Err(e) = result {
            std::panic::resume_unwind(e);
        }
    }
}
