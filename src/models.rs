use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used when no readable product name could be extracted.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Axis-aligned bounding box in source-image pixel coordinates.
///
/// `x1 < x2` and `y1 < y2` are expected but not enforced; degenerate boxes are
/// carried through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Pixel centroid, rounded toward negative infinity.
    pub fn center(&self) -> (i32, i32) {
        (
            (self.x1 + self.x2).div_euclid(2),
            (self.y1 + self.y2).div_euclid(2),
        )
    }
}

impl From<(i32, i32, i32, i32)> for BBox {
    fn from((x1, y1, x2, y2): (i32, i32, i32, i32)) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

fn unknown_label() -> String {
    UNKNOWN_LABEL.to_string()
}

/// One physical product instance as observed in the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(default = "unknown_label")]
    pub label: String,
    #[serde(default)]
    pub ocr_text: Vec<String>,
    pub x_center: i32,
    pub y_center: i32,
    pub bbox: BBox,
}

impl Detection {
    /// Build a detection whose centroid is derived from its bounding box.
    pub fn from_bbox(label: impl Into<String>, ocr_text: Vec<String>, bbox: BBox) -> Self {
        let (x_center, y_center) = bbox.center();
        Self {
            label: label.into(),
            ocr_text,
            x_center,
            y_center,
            bbox,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.label == UNKNOWN_LABEL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Correct,
    Incorrect,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Correct => f.write_str("CORRECT"),
            Status::Incorrect => f.write_str("INCORRECT"),
        }
    }
}

/// Final outcome of one arrangement check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub status: Status,
    /// One message per clustered row, top to bottom.
    pub messages: Vec<String>,
    /// Boxes of misplaced detections, deduplicated in first-seen order.
    pub wrong_boxes: Vec<BBox>,
}

impl Verdict {
    pub fn is_correct(&self) -> bool {
        self.status == Status::Correct
    }
}

/// One piece of text read from a product region, with the reader's confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    pub confidence: f32,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}
