use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use super::RowAnalysis;
use crate::models::{BBox, Detection, Status, Verdict};

/// Fold per-row findings, top row first, into the overall verdict.
///
/// Any row with misplaced detections makes the status `INCORRECT`. Boxes are
/// collected in row order, ascending position within a row, and deduplicated
/// keeping the first occurrence.
pub fn build_verdict(detections: &[Detection], rows: &[RowAnalysis]) -> Verdict {
    let mut status = Status::Correct;
    let mut messages = Vec::with_capacity(rows.len());
    let mut wrong_boxes: Vec<BBox> = Vec::new();

    for (row_idx, row) in rows.iter().enumerate() {
        let row_number = row_idx + 1;
        let misplaced = &row.segments.misplaced;
        if misplaced.is_empty() {
            messages.push(format!("Row {row_number} correct"));
            continue;
        }

        status = Status::Incorrect;
        let labels: BTreeSet<&str> = misplaced
            .iter()
            .map(|&position| row.canonical[position].as_str())
            .collect();
        let labels: Vec<&str> = labels.into_iter().collect();
        debug!(row = row_number, positions = ?misplaced, labels = ?labels, "misplaced products");
        messages.push(format!(
            "Row {row_number} misplaced products: {}",
            labels.join(", ")
        ));
        wrong_boxes.extend(
            misplaced
                .iter()
                .map(|&position| detections[row.order[position]].bbox),
        );
    }

    let mut seen = HashSet::new();
    wrong_boxes.retain(|bbox| seen.insert(*bbox));

    Verdict {
        status,
        messages,
        wrong_boxes,
    }
}
