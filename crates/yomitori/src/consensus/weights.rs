//! Persisted per-engine trust weights.
//!
//! The store owns the engine-id → weight map. Reads hand out copies, so a
//! selection never observes a half-applied feedback event. Writes to disk go
//! through a temp file in the target directory followed by a rename, so a
//! concurrent [`load_weights`] sees either the old file or the new one.

use crate::engines::EngineKind;
use crate::{Result, YomitoriError};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Engine id → trust weight. Ordered so the persisted file is stable.
pub type WeightMap = BTreeMap<String, f64>;

pub const MIN_WEIGHT: f64 = 0.1;
pub const MAX_WEIGHT: f64 = 2.0;
/// Weight of an engine the store has never seen.
pub const DEFAULT_WEIGHT: f64 = 1.0;

const REWARD_FACTOR: f64 = 1.05;
const PENALTY_FACTOR: f64 = 0.95;

/// Built-in weights for the known engines.
pub fn default_weights() -> WeightMap {
    EngineKind::KNOWN
        .iter()
        .map(|kind| (kind.id().to_string(), kind.default_weight()))
        .collect()
}

/// Read weights from `path`, falling back to [`default_weights`].
///
/// Never fails: a missing file is the normal first-run case, and an unreadable
/// or malformed file is logged and replaced by the defaults. Entries with an
/// empty id or a non-finite weight are dropped, and the rest are clamped into
/// `[MIN_WEIGHT, MAX_WEIGHT]`.
pub fn load_weights(path: &Path) -> WeightMap {
    if !path.exists() {
        tracing::debug!("No weight file at {}, using default engine weights", path.display());
        return default_weights();
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Failed to read weight file {}: {}. Using defaults", path.display(), e);
            return default_weights();
        }
    };

    let parsed: BTreeMap<String, f64> = match serde_json::from_str(&content) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Malformed weight file {}: {}. Using defaults", path.display(), e);
            return default_weights();
        }
    };

    let weights: WeightMap = parsed
        .into_iter()
        .filter(|(engine, weight)| !engine.is_empty() && weight.is_finite())
        .map(|(engine, weight)| (engine, clamp_weight(weight)))
        .collect();

    tracing::debug!("Loaded {} engine weights from {}", weights.len(), path.display());
    weights
}

fn clamp_weight(weight: f64) -> f64 {
    weight.clamp(MIN_WEIGHT, MAX_WEIGHT)
}

/// Owned, thread-safe store of engine trust weights.
///
/// # Thread Safety
///
/// The map sits behind a `RwLock`; every read-modify-write happens under the
/// write guard, so concurrent [`adjust`](Self::adjust) calls never drop an
/// update. [`adjust_and_persist`](Self::adjust_and_persist) and
/// [`persist`](Self::persist) additionally hold an exclusive write lock so the
/// file on disk always reflects the newest snapshot.
///
/// # Example
///
/// ```rust
/// use yomitori::consensus::EngineWeightStore;
///
/// let store = EngineWeightStore::in_memory();
/// assert_eq!(store.get("manga_ocr"), 1.2);
/// assert_eq!(store.get("unknown-engine"), 1.0);
///
/// let updated = store.adjust("tesseract", true);
/// assert!((updated - 1.05).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct EngineWeightStore {
    path: Option<PathBuf>,
    weights: RwLock<WeightMap>,
    write_lock: Mutex<()>,
}

impl EngineWeightStore {
    /// Open a store backed by the JSON file at `path`.
    ///
    /// The file is read once here; see [`load_weights`] for fallback rules.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let weights = load_weights(&path);
        Self {
            path: Some(path),
            weights: RwLock::new(weights),
            write_lock: Mutex::new(()),
        }
    }

    /// A store seeded with [`default_weights`] that never touches disk.
    pub fn in_memory() -> Self {
        Self::with_weights(default_weights())
    }

    /// A non-persistent store seeded with `weights` (clamped into range).
    pub fn with_weights(weights: WeightMap) -> Self {
        let weights = weights
            .into_iter()
            .filter(|(_, weight)| weight.is_finite())
            .map(|(engine, weight)| (engine, clamp_weight(weight)))
            .collect();
        Self {
            path: None,
            weights: RwLock::new(weights),
            write_lock: Mutex::new(()),
        }
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current weight for `engine`, or [`DEFAULT_WEIGHT`] if unseen.
    pub fn get(&self, engine: &str) -> f64 {
        self.weights.read().get(engine).copied().unwrap_or(DEFAULT_WEIGHT)
    }

    /// Copy of the whole map.
    pub fn snapshot(&self) -> WeightMap {
        self.weights.read().clone()
    }

    /// Nudge `engine`'s weight up 5% if it was correct, down 5% otherwise.
    ///
    /// Unseen engines start from [`DEFAULT_WEIGHT`]. The result is clamped to
    /// `[MIN_WEIGHT, MAX_WEIGHT]` and returned. Memory only; call
    /// [`persist`](Self::persist) to flush.
    pub fn adjust(&self, engine: &str, was_correct: bool) -> f64 {
        let mut weights = self.weights.write();
        let current = weights.get(engine).copied().unwrap_or(DEFAULT_WEIGHT);
        let factor = if was_correct { REWARD_FACTOR } else { PENALTY_FACTOR };
        let updated = clamp_weight(current * factor);
        weights.insert(engine.to_string(), updated);

        tracing::debug!(
            engine,
            was_correct,
            previous = current,
            updated,
            "Adjusted engine weight"
        );
        updated
    }

    /// Write the current map to the backing file.
    ///
    /// Creates the parent directory if needed. A store without a backing file
    /// treats this as a no-op.
    ///
    /// # Errors
    ///
    /// `Persistence` if the directory or file cannot be written. The in-memory
    /// map is left as it is; the next successful persist catches up.
    pub fn persist(&self) -> Result<()> {
        let _guard = self.write_lock.lock();
        let snapshot = self.snapshot();
        self.write_snapshot(&snapshot)
    }

    /// [`adjust`](Self::adjust) followed by [`persist`](Self::persist) under a
    /// single exclusive lock.
    ///
    /// # Errors
    ///
    /// `Persistence` if the write fails. The adjustment has already been
    /// applied in memory and is not rolled back.
    pub fn adjust_and_persist(&self, engine: &str, was_correct: bool) -> Result<f64> {
        let _guard = self.write_lock.lock();
        let updated = self.adjust(engine, was_correct);
        let snapshot = self.snapshot();
        self.write_snapshot(&snapshot)?;
        Ok(updated)
    }

    fn write_snapshot(&self, snapshot: &WeightMap) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };

        let serialized = serde_json::to_string_pretty(snapshot)
            .map_err(|e| YomitoriError::persistence_with_source("Failed to serialize engine weights", e))?;

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| {
            YomitoriError::persistence_with_source(
                format!("Failed to create weight directory {}", parent.display()),
                e,
            )
        })?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "engine_weights.json".to_string());
        let pid = std::process::id();
        let thread_id = std::thread::current().id();
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let temp_path = parent.join(format!(".{}.tmp.{}.{:?}.{}", file_name, pid, thread_id, timestamp));

        fs::write(&temp_path, serialized.as_bytes()).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            YomitoriError::persistence_with_source(
                format!("Failed to write temp weight file {}", temp_path.display()),
                e,
            )
        })?;

        fs::rename(&temp_path, path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            YomitoriError::persistence_with_source(format!("Failed to replace weight file {}", path.display()), e)
        })?;

        tracing::debug!("Persisted {} engine weights to {}", snapshot.len(), path.display());
        Ok(())
    }
}

impl Default for EngineWeightStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
