pub mod matcher;
pub mod rows;
pub mod segments;
pub mod similarity;
pub mod verdict;

use tracing::{debug, info};

use crate::config::{validate_match_threshold, ShelfConfig, DEFAULT_MATCH_THRESHOLD, DEFAULT_ROW_THRESH};
use crate::error::ArrangementResult;
use crate::models::{Detection, Verdict};

pub use matcher::{match_products, MatchedRow};
pub use rows::{cluster_rows, Row};
pub use segments::{segment, Segment, SegmentAnalysis};
pub use similarity::{normalize_label, texts_match};
pub use verdict::build_verdict;

/// Everything learned about one clustered row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowAnalysis {
    pub y_mean: f64,
    /// Detection indices, left to right.
    pub order: Vec<usize>,
    /// Canonical product label per position in `order`.
    pub canonical: Vec<String>,
    /// Segment keys derived from `canonical`.
    pub normalized: Vec<String>,
    pub segments: SegmentAnalysis,
}

/// Verdict plus the per-row trace it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrangementReport {
    pub verdict: Verdict,
    pub rows: Vec<RowAnalysis>,
}

/// Arrangement verification entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrangementChecker {
    pub row_thresh: f64,
    pub match_threshold: f64,
}

impl ArrangementChecker {
    pub fn new() -> Self {
        Self {
            row_thresh: DEFAULT_ROW_THRESH,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }

    pub fn from_config(config: &ShelfConfig) -> Self {
        Self {
            row_thresh: config.row_thresh,
            match_threshold: config.match_threshold,
        }
    }

    pub fn with_row_thresh(mut self, row_thresh: f64) -> Self {
        self.row_thresh = row_thresh;
        self
    }

    pub fn with_match_threshold(mut self, match_threshold: f64) -> Self {
        self.match_threshold = match_threshold;
        self
    }

    /// Run rows -> fuzzy matching -> segments -> verdict over one image's
    /// detections.
    pub fn check(&self, detections: &[Detection]) -> ArrangementResult<ArrangementReport> {
        validate_match_threshold(self.match_threshold)?;
        let rows = cluster_rows(detections, self.row_thresh)?;
        debug!(detections = detections.len(), rows = rows.len(), "clustered rows");

        let analyses: Vec<RowAnalysis> = rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| self.analyze_row(detections, row, row_idx + 1))
            .collect();

        let verdict = build_verdict(detections, &analyses);
        info!(status = %verdict.status, misplaced = verdict.wrong_boxes.len(), "arrangement checked");
        Ok(ArrangementReport {
            verdict,
            rows: analyses,
        })
    }

    /// Same as [`check`](Self::check) without the per-row trace.
    pub fn verify(&self, detections: &[Detection]) -> ArrangementResult<Verdict> {
        self.check(detections).map(|report| report.verdict)
    }

    fn analyze_row(&self, detections: &[Detection], row: &Row, row_number: usize) -> RowAnalysis {
        let MatchedRow { order, canonical } = match_products(detections, row, self.match_threshold);
        let normalized: Vec<String> = canonical.iter().map(|l| normalize_label(l)).collect();
        let segments = segment(&normalized);

        if tracing::enabled!(tracing::Level::DEBUG) {
            let original: Vec<&str> = order.iter().map(|&i| detections[i].label.as_str()).collect();
            debug!(row = row_number, labels = ?original, "original labels");
        }
        debug!(row = row_number, labels = ?canonical, "after fuzzy grouping");
        debug!(row = row_number, segments = ?segments.segments, "segments");

        RowAnalysis {
            y_mean: row.y_mean,
            order,
            canonical,
            normalized,
            segments,
        }
    }
}

impl Default for ArrangementChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Check detections with default thresholds.
pub fn check_arrangement(detections: &[Detection]) -> ArrangementResult<Verdict> {
    ArrangementChecker::new().verify(detections)
}
