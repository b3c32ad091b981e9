//! Tests for loading tuning parameters.

mod common;

use std::path::Path;

use shelfcheck::config::{
    DEFAULT_MATCH_THRESHOLD, DEFAULT_MIN_OCR_CONFIDENCE, DEFAULT_OCR_MAX_SIDE, DEFAULT_ROW_THRESH,
};
use shelfcheck::ShelfConfig;

use common::*;

#[test]
fn test_defaults() {
    let config = ShelfConfig::default();

    assert_eq!(config.row_thresh, DEFAULT_ROW_THRESH);
    assert_eq!(config.match_threshold, DEFAULT_MATCH_THRESHOLD);
    assert_eq!(config.min_ocr_confidence, DEFAULT_MIN_OCR_CONFIDENCE);
    assert_eq!(config.ocr_max_side, DEFAULT_OCR_MAX_SIDE);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_file_keeps_other_defaults() -> anyhow::Result<()> {
    let config = ShelfConfig::from_toml_str("row_thresh = 45.0\n", Path::new("shelf.toml"))?;

    assert_eq!(config.row_thresh, 45.0);
    assert_eq!(config.match_threshold, DEFAULT_MATCH_THRESHOLD);
    assert_eq!(config.ocr_max_side, DEFAULT_OCR_MAX_SIDE);
    Ok(())
}

#[test]
fn test_load_from_file() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let path = temp.path().join("shelf.toml");
    std::fs::write(
        &path,
        "match_threshold = 0.7\nmin_ocr_confidence = 0.5\nocr_max_side = 800\n",
    )?;

    let config = ShelfConfig::load(&path)?;

    assert_eq!(config.match_threshold, 0.7);
    assert_eq!(config.min_ocr_confidence, 0.5);
    assert_eq!(config.ocr_max_side, 800);
    assert_eq!(config.row_thresh, DEFAULT_ROW_THRESH);

    let checker = ArrangementChecker::from_config(&config);
    assert_eq!(checker.match_threshold, 0.7);
    Ok(())
}

#[test]
fn test_invalid_values_rejected() {
    let path = Path::new("shelf.toml");

    for contents in ["row_thresh = 0.0", "match_threshold = -1.0", "ocr_max_side = 0"] {
        let result = ShelfConfig::from_toml_str(contents, path);
        assert!(
            matches!(result, Err(ArrangementError::InvalidConfig { .. })),
            "{contents} should be rejected"
        );
    }
}

#[test]
fn test_malformed_toml_reports_path() {
    let result = ShelfConfig::from_toml_str("row_thresh = \"wide\"", Path::new("rig.toml"));

    match result {
        Err(ArrangementError::Config { path, .. }) => assert_eq!(path, Path::new("rig.toml")),
        other => panic!("expected config parse error, got {other:?}"),
    }
}

#[test]
fn test_missing_file() {
    let result = ShelfConfig::load("/nonexistent/shelf.toml");

    assert!(matches!(result, Err(ArrangementError::Io { .. })));
}
