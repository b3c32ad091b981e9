//! Tests for the JSON report and detection input format.

mod common;

use serde_json::{json, Value};
use shelfcheck::ShelfReport;

use common::*;

#[test]
fn test_report_json_shape() -> anyhow::Result<()> {
    let detections = shelf_row(&["A", "B", "A"], 100);
    let report = ArrangementChecker::new().check(&detections)?;

    let value: Value = serde_json::from_str(&ShelfReport::new(&report).to_json(false)?)?;

    assert_eq!(
        value,
        json!({
            "status": "INCORRECT",
            "messages": ["Row 1 misplaced products: B"],
            "misplaced_boxes": [{"x1": 90, "y1": 90, "x2": 110, "y2": 110}],
        })
    );
    Ok(())
}

#[test]
fn test_report_trace_lists_rows_left_to_right() -> anyhow::Result<()> {
    let detections = vec![
        det("Milk", &["Fresh Milk"], 200, 300),
        det("Corn Flakes", &["Corn", "Flakes"], 100, 300),
        det("unknown", &[], 50, 100),
    ];
    let report = ArrangementChecker::new().check(&detections)?;

    let shelf_report = ShelfReport::new(&report).with_trace(&report, &detections);
    let value: Value = serde_json::from_str(&shelf_report.to_json(true)?)?;

    assert_eq!(value["status"], "CORRECT");
    assert_eq!(value["row_wise_ocr"], json!([[[]], [["Corn", "Flakes"], ["Fresh Milk"]]]));
    assert_eq!(
        value["row_wise_products"],
        json!([["unknown"], ["Corn Flakes", "Milk"]])
    );
    Ok(())
}

#[test]
fn test_detection_json_defaults() -> anyhow::Result<()> {
    let detection: Detection = serde_json::from_str(
        r#"{"x_center": 15, "y_center": 25, "bbox": {"x1": 10, "y1": 20, "x2": 20, "y2": 30}}"#,
    )?;

    assert_eq!(detection.label, UNKNOWN_LABEL);
    assert!(detection.ocr_text.is_empty());
    assert_eq!(detection.bbox, BBox::new(10, 20, 20, 30));
    Ok(())
}

#[test]
fn test_status_serializes_uppercase() -> anyhow::Result<()> {
    assert_eq!(serde_json::to_string(&Status::Correct)?, "\"CORRECT\"");
    assert_eq!(Status::Incorrect.to_string(), "INCORRECT");
    Ok(())
}
