mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from shelfcheck for tests
pub use shelfcheck::{
    ArrangementChecker, ArrangementError, BBox, Detection, Status, TextFragment, Verdict,
    UNKNOWN_LABEL,
};
