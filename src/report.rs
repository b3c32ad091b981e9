use serde::Serialize;

use crate::arrangement::ArrangementReport;
use crate::models::{BBox, Detection, Status};

/// JSON-facing summary of one arrangement check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShelfReport {
    pub status: Status,
    pub messages: Vec<String>,
    pub misplaced_boxes: Vec<BBox>,
    /// Raw OCR fragments per row, left to right.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_wise_ocr: Option<Vec<Vec<Vec<String>>>>,
    /// Extracted product names per row, left to right.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_wise_products: Option<Vec<Vec<String>>>,
}

impl ShelfReport {
    pub fn new(report: &ArrangementReport) -> Self {
        let verdict = &report.verdict;
        Self {
            status: verdict.status,
            messages: verdict.messages.clone(),
            misplaced_boxes: verdict.wrong_boxes.clone(),
            row_wise_ocr: None,
            row_wise_products: None,
        }
    }

    /// Include the per-row OCR and product-name trace.
    pub fn with_trace(mut self, report: &ArrangementReport, detections: &[Detection]) -> Self {
        let rows = &report.rows;
        self.row_wise_ocr = Some(
            rows.iter()
                .map(|row| row.order.iter().map(|&i| detections[i].ocr_text.clone()).collect())
                .collect(),
        );
        self.row_wise_products = Some(
            rows.iter()
                .map(|row| row.order.iter().map(|&i| detections[i].label.clone()).collect())
                .collect(),
        );
        self
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}
