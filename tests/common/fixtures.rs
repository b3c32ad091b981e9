use shelfcheck::{BBox, Detection};

/// Half-size of the square box placed around each test detection.
pub const HALF_BOX: i32 = 10;

/// Creates a detection centred at (x, y) with a 20x20 box and the given OCR text.
pub fn det(label: &str, ocr: &[&str], x: i32, y: i32) -> Detection {
    Detection {
        label: label.to_string(),
        ocr_text: ocr.iter().map(|s| s.to_string()).collect(),
        x_center: x,
        y_center: y,
        bbox: BBox::new(x - HALF_BOX, y - HALF_BOX, x + HALF_BOX, y + HALF_BOX),
    }
}

/// Creates a detection with no OCR text, so it never fuzzy-merges with another
/// and keeps its own label.
pub fn labelled(label: &str, x: i32, y: i32) -> Detection {
    det(label, &[], x, y)
}

/// Creates one shelf row at height `y`, products spaced 50px apart left to right.
pub fn shelf_row(labels: &[&str], y: i32) -> Vec<Detection> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| labelled(label, 50 + 50 * i as i32, y))
        .collect()
}
