use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ArrangementError, ArrangementResult};

pub const DEFAULT_ROW_THRESH: f64 = 30.0;
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.5;
pub const DEFAULT_MIN_OCR_CONFIDENCE: f32 = 0.3;
pub const DEFAULT_OCR_MAX_SIDE: u32 = 400;

/// Tunables for one camera rig.
///
/// Every field is optional in the TOML file; missing keys fall back to the
/// defaults above.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShelfConfig {
    /// Vertical tolerance (px) for joining a detection to an existing row.
    pub row_thresh: f64,
    /// Minimum text similarity for two detections to count as one product.
    pub match_threshold: f64,
    /// OCR fragments at or below this confidence are discarded.
    pub min_ocr_confidence: f32,
    /// Crops are downscaled so their longest side is at most this many pixels
    /// before text reading.
    pub ocr_max_side: u32,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            row_thresh: DEFAULT_ROW_THRESH,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            min_ocr_confidence: DEFAULT_MIN_OCR_CONFIDENCE,
            ocr_max_side: DEFAULT_OCR_MAX_SIDE,
        }
    }
}

impl ShelfConfig {
    pub fn from_toml_str(contents: &str, path: &Path) -> ArrangementResult<Self> {
        let config: ShelfConfig =
            toml::from_str(contents).map_err(|source| ArrangementError::Config {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ArrangementResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ArrangementError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents, path)
    }

    pub fn validate(&self) -> ArrangementResult<()> {
        validate_row_thresh(self.row_thresh)?;
        validate_match_threshold(self.match_threshold)?;
        if !self.min_ocr_confidence.is_finite() {
            return Err(ArrangementError::invalid_config(
                "min_ocr_confidence must be finite",
            ));
        }
        if self.ocr_max_side == 0 {
            return Err(ArrangementError::invalid_config(
                "ocr_max_side must be at least 1",
            ));
        }
        Ok(())
    }
}

pub(crate) fn validate_row_thresh(row_thresh: f64) -> ArrangementResult<()> {
    if !row_thresh.is_finite() || row_thresh <= 0.0 {
        return Err(ArrangementError::invalid_config(format!(
            "row_thresh must be a positive number, got {row_thresh}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_match_threshold(threshold: f64) -> ArrangementResult<()> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(ArrangementError::invalid_config(format!(
            "match_threshold must be a positive number, got {threshold}"
        )));
    }
    Ok(())
}
