use tracing::trace;

use super::rows::Row;
use super::similarity::texts_match;
use crate::models::{Detection, UNKNOWN_LABEL};

/// Detections of one row believed to be the same product.
#[derive(Debug)]
struct FuzzyGroup<'a> {
    sample: &'a [String],
    labels: Vec<&'a str>,
    positions: Vec<usize>,
}

impl FuzzyGroup<'_> {
    fn label(&self) -> &str {
        self.labels
            .iter()
            .copied()
            .find(|label| *label != UNKNOWN_LABEL)
            .unwrap_or(UNKNOWN_LABEL)
    }
}

/// A row in left-to-right order with one canonical label per detection.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedRow {
    /// Detection indices sorted by `x_center`, ties in row order.
    pub order: Vec<usize>,
    /// Canonical label for each entry of `order`.
    pub canonical: Vec<String>,
}

/// Order a row left to right.
pub fn order_left_to_right(detections: &[Detection], row: &Row) -> Vec<usize> {
    let mut order = row.members.clone();
    order.sort_by_key(|&i| detections[i].x_center);
    order
}

/// Assign canonical labels to a row by first-fit fuzzy grouping of OCR text.
///
/// Each detection is compared against the open groups in creation order and
/// joins the first one whose sample text matches; otherwise it opens a group
/// with its own text as sample. A group's label is the first known label seen
/// among its members.
pub fn match_products(detections: &[Detection], row: &Row, threshold: f64) -> MatchedRow {
    let order = order_left_to_right(detections, row);
    let mut groups: Vec<FuzzyGroup<'_>> = Vec::new();

    for (position, &index) in order.iter().enumerate() {
        let detection = &detections[index];
        let matched = groups
            .iter_mut()
            .find(|group| texts_match(group.sample, &detection.ocr_text, threshold));
        match matched {
            Some(group) => {
                trace!(
                    position,
                    label = %detection.label,
                    ocr = ?detection.ocr_text,
                    sample = ?group.sample,
                    "matched group"
                );
                group.labels.push(detection.label.as_str());
                group.positions.push(position);
            }
            None => {
                trace!(position, label = %detection.label, ocr = ?detection.ocr_text, "new group");
                groups.push(FuzzyGroup {
                    sample: &detection.ocr_text,
                    labels: vec![detection.label.as_str()],
                    positions: vec![position],
                });
            }
        }
    }

    let mut canonical = vec![UNKNOWN_LABEL.to_string(); order.len()];
    for group in &groups {
        let label = group.label();
        for &position in &group.positions {
            canonical[position] = label.to_string();
        }
    }

    MatchedRow { order, canonical }
}
