//! Engine weight persistence: round trips, fallbacks and write failures.

use std::fs;
use tempfile::tempdir;
use yomitori::consensus::{MAX_WEIGHT, MIN_WEIGHT, WeightMap, default_weights, load_weights};
use yomitori::{
    ConsensusConfig, ConsensusSelector, EngineWeightStore, OcrResult, SelectionStrategy, TextOrientation, YomitoriError,
};

#[test]
fn test_weights_round_trip_through_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("engine_weights.json");

    let selector = ConsensusSelector::open(&path);
    selector.record_feedback("tesseract", true).unwrap();
    selector.record_feedback("easyocr", false).unwrap();
    selector.record_feedback("paddle", true).unwrap();
    let before = selector.weights();

    let reopened = ConsensusSelector::open(&path);
    let after = reopened.weights();

    assert_eq!(before.len(), after.len());
    for (engine, weight) in &before {
        assert!((after[engine] - weight).abs() < 1e-6, "{engine}: {weight} vs {}", after[engine]);
    }
    assert!((after["tesseract"] - 1.05).abs() < 1e-6);
    assert!((after["easyocr"] - 0.95).abs() < 1e-6);
    assert!((after["manga_ocr"] - 1.2).abs() < 1e-6);
    assert!((after["paddle"] - 1.05).abs() < 1e-6);
}

#[test]
fn test_first_run_uses_defaults_without_writing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("engine_weights.json");

    let selector = ConsensusSelector::open(&path);
    assert_eq!(selector.weights(), default_weights());
    assert!(!path.exists());
}

#[test]
fn test_persisted_file_is_a_flat_json_object() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("engine_weights.json");

    let selector = ConsensusSelector::open(&path);
    selector.record_feedback("manga_ocr", false).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let object = raw.as_object().unwrap();
    assert_eq!(object.len(), 3);
    assert!((object["manga_ocr"].as_f64().unwrap() - 1.14).abs() < 1e-9);
    assert_eq!(object["tesseract"].as_f64().unwrap(), 1.0);
}

#[test]
fn test_corrupt_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("engine_weights.json");
    fs::write(&path, "[1, 2, 3]").unwrap();

    let selector = ConsensusSelector::open(&path);
    assert_eq!(selector.weights(), default_weights());

    // the next successful feedback repairs the file
    selector.record_feedback("easyocr", true).unwrap();
    let repaired = load_weights(&path);
    assert!((repaired["easyocr"] - 1.05).abs() < 1e-9);
}

#[test]
fn test_out_of_range_file_values_are_clamped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("engine_weights.json");
    fs::write(&path, r#"{"tesseract": 40.0, "easyocr": -3.0, "manga_ocr": 1.1}"#).unwrap();

    let store = EngineWeightStore::open(&path);
    assert_eq!(store.get("tesseract"), MAX_WEIGHT);
    assert_eq!(store.get("easyocr"), MIN_WEIGHT);
    assert_eq!(store.get("manga_ocr"), 1.1);
}

#[test]
fn test_failed_persist_is_a_warning_and_keeps_memory_update() {
    let dir = tempdir().unwrap();
    // A regular file where the weight directory should be.
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();
    let path = blocker.join("engine_weights.json");

    let selector = ConsensusSelector::open(&path);
    let err = selector.record_feedback("tesseract", true).unwrap_err();

    assert!(matches!(err, YomitoriError::Persistence { .. }));
    assert!(err.is_warning());
    assert!((selector.weight("tesseract") - 1.05).abs() < 1e-12);

    // later selections already see the new weight
    let results = vec![
        OcrResult::new("tesseract", "a", 0.5, TextOrientation::Horizontal).unwrap(),
        OcrResult::new("easyocr", "b", 0.5, TextOrientation::Horizontal).unwrap(),
    ];
    let consensus = selector
        .select_best(&results, SelectionStrategy::ConfidenceWeighted)
        .unwrap();
    assert_eq!(consensus.selected_engine, "tesseract");
}

#[test]
fn test_empty_feedback_engine_changes_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("engine_weights.json");
    let selector = ConsensusSelector::open(&path);

    let err = selector.record_feedback("", true).unwrap_err();
    assert!(matches!(err, YomitoriError::InvalidInput { .. }));
    assert_eq!(selector.weights(), default_weights());
    assert!(!path.exists());
}

#[test]
fn test_unseen_engine_feedback_adds_entry() {
    let selector = ConsensusSelector::new(EngineWeightStore::with_weights(WeightMap::new()));
    assert_eq!(selector.weight("cloud_vision"), 1.0);

    let updated = selector.record_feedback("cloud_vision", false).unwrap();
    assert!((updated - 0.95).abs() < 1e-12);
    assert!(selector.weights().contains_key("cloud_vision"));
}

#[test]
fn test_selector_from_config_respects_persist_flag() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("weights").join("engine_weights.json");

    let mut config = ConsensusConfig {
        weights_path: path.clone(),
        persist_weights: false,
        strategy: SelectionStrategy::Learned,
        orientation_hint: None,
    };

    let selector = ConsensusSelector::from_config(&config);
    assert_eq!(selector.default_strategy(), SelectionStrategy::Learned);
    selector.record_feedback("tesseract", true).unwrap();
    assert!(!path.exists());

    config.persist_weights = true;
    let selector = ConsensusSelector::from_config(&config);
    selector.record_feedback("tesseract", true).unwrap();
    assert!(path.exists());
    assert_eq!(selector.weight_store().path(), Some(path.as_path()));
}
