use tracing::trace;

use crate::config::validate_row_thresh;
use crate::error::{ArrangementError, ArrangementResult};
use crate::models::Detection;

/// Detections judged to sit on one shelf level, stored as indices into the
/// caller's detection slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub members: Vec<usize>,
    pub y_mean: f64,
}

impl Row {
    fn start(index: usize, y: i32) -> Self {
        Self {
            members: vec![index],
            y_mean: f64::from(y),
        }
    }

    fn join(&mut self, index: usize, detections: &[Detection]) {
        self.members.push(index);
        let sum: f64 = self
            .members
            .iter()
            .map(|&i| f64::from(detections[i].y_center))
            .sum();
        self.y_mean = sum / self.members.len() as f64;
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Group detections into shelf rows by vertical proximity.
///
/// Single pass in arrival order: each detection joins the first row whose
/// running mean `y_center` is within `row_thresh` (inclusive), otherwise it
/// opens a new row. The result depends on input order; a borderline detection
/// can land in a different row if the input is permuted. Rows come back sorted
/// top to bottom by mean, ties keeping creation order.
pub fn cluster_rows(detections: &[Detection], row_thresh: f64) -> ArrangementResult<Vec<Row>> {
    if detections.is_empty() {
        return Err(ArrangementError::invalid_input(
            "at least one detection is required to cluster rows",
        ));
    }
    validate_row_thresh(row_thresh)?;

    let mut rows: Vec<Row> = Vec::new();
    for (index, detection) in detections.iter().enumerate() {
        let y = f64::from(detection.y_center);
        match rows
            .iter_mut()
            .find(|row| (row.y_mean - y).abs() <= row_thresh)
        {
            Some(row) => {
                row.join(index, detections);
                trace!(index, y_center = detection.y_center, y_mean = row.y_mean, "joined row");
            }
            None => {
                trace!(index, y_center = detection.y_center, "started row");
                rows.push(Row::start(index, detection.y_center));
            }
        }
    }

    rows.sort_by(|a, b| a.y_mean.total_cmp(&b.y_mean));
    Ok(rows)
}
