//! Detection supplier: turns detector regions plus the shelf image into
//! [`Detection`]s ready for arrangement checking.
//!
//! Locating products and reading characters are left to external engines; this
//! module crops, reads through a [`TextReader`](ocr::TextReader), filters the
//! fragments and picks a product name for each region.

pub mod ocr;
pub mod steps;

use std::path::PathBuf;
use std::sync::Arc;

use image::DynamicImage;
use tracing::{debug, warn};

use crate::config::{ShelfConfig, DEFAULT_MIN_OCR_CONFIDENCE, DEFAULT_OCR_MAX_SIDE};
use crate::models::{BBox, Detection, TextFragment, UNKNOWN_LABEL};
use crate::pipeline::{Pipeline, PipelineStep};
use ocr::TextReader;
use steps::{DownscaleStep, RegionCropStep, TextReadStep, OCR_FRAGMENTS};

/// Characters trimmed from both ends of a fragment when picking a name.
const NAME_TRIM_CHARS: &[char] = &[
    '[', ']', '(', ')', '{', '}', '\'', '"', '.', ',', ';', ':', '!', '?',
];

/// Keep fragments read with confidence above `min_confidence`, trimmed.
pub fn filter_fragments(fragments: &[TextFragment], min_confidence: f32) -> Vec<String> {
    fragments
        .iter()
        .filter(|f| f.confidence > min_confidence)
        .map(|f| f.text.trim().to_string())
        .collect()
}

/// Best-effort single product name: the longest fragment that contains a
/// letter once surrounding punctuation is removed. Earlier fragments win ties.
pub fn extract_product_name<S: AsRef<str>>(texts: &[S]) -> String {
    let mut best: Option<&str> = None;
    let mut best_len = 0;
    for text in texts {
        let candidate = text.as_ref().trim_matches(NAME_TRIM_CHARS);
        if !candidate.chars().any(char::is_alphabetic) {
            continue;
        }
        let len = candidate.chars().count();
        if best.is_none() || len > best_len {
            best = Some(candidate);
            best_len = len;
        }
    }
    best.unwrap_or(UNKNOWN_LABEL).to_string()
}

/// Regions used when the detector finds nothing: top and bottom halves.
pub fn fallback_regions(width: u32, height: u32) -> Vec<BBox> {
    let width = width as i32;
    let height = height as i32;
    let mid_y = height / 2;
    vec![
        BBox::new(0, 0, width, mid_y),
        BBox::new(0, mid_y, width, height),
    ]
}

/// Builds detections from an image and the detector's boxes.
pub struct DetectionSupplier {
    pub min_ocr_confidence: f32,
    pub ocr_max_side: u32,
    reader_step: Arc<dyn PipelineStep>,
    debug_dir: Option<PathBuf>,
}

impl DetectionSupplier {
    /// Supplier reading text with the given reader.
    pub fn new(reader: Arc<dyn TextReader>) -> Self {
        Self::with_step(Arc::new(TextReadStep { reader }))
    }

    /// Supplier backed by the ocrs engine, loaded on first use. If the models
    /// are missing every region reads as empty.
    #[cfg(feature = "ocr")]
    pub fn with_ocrs() -> Self {
        Self::with_step(Arc::new(steps::OcrStep::new()))
    }

    fn with_step(reader_step: Arc<dyn PipelineStep>) -> Self {
        Self {
            min_ocr_confidence: DEFAULT_MIN_OCR_CONFIDENCE,
            ocr_max_side: DEFAULT_OCR_MAX_SIDE,
            reader_step,
            debug_dir: None,
        }
    }

    pub fn with_config(mut self, config: &ShelfConfig) -> Self {
        self.min_ocr_confidence = config.min_ocr_confidence;
        self.ocr_max_side = config.ocr_max_side;
        self
    }

    /// Save every step's crops into `dir`, which must be empty or absent.
    pub fn with_debug(mut self, dir: PathBuf) -> Self {
        self.debug_dir = Some(dir);
        self
    }

    /// One detection per region, in region order. An empty region list falls
    /// back to splitting the image into two halves.
    pub fn supply(&self, image: DynamicImage, regions: &[BBox]) -> anyhow::Result<Vec<Detection>> {
        let regions = if regions.is_empty() {
            warn!("no product regions supplied, splitting image into halves");
            fallback_regions(image.width(), image.height())
        } else {
            regions.to_vec()
        };

        let mut pipeline = Pipeline::new()
            .add_step(Arc::new(RegionCropStep { regions }))
            .add_step(Arc::new(DownscaleStep {
                max_side: self.ocr_max_side,
            }))
            .add_step(self.reader_step.clone());
        if let Some(dir) = &self.debug_dir {
            pipeline = pipeline.with_debug(dir.clone())?;
        }

        let results = pipeline.run(image)?;

        let mut detections = Vec::with_capacity(results.len());
        for item in results {
            let bbox = item
                .region
                .ok_or_else(|| anyhow::anyhow!("Pipeline produced an item without a region"))?;
            let fragments = item.get_fragments(OCR_FRAGMENTS).unwrap_or_default();
            let ocr_text = filter_fragments(fragments, self.min_ocr_confidence);
            let label = extract_product_name(&ocr_text);
            debug!(bbox = %bbox, label = %label, ocr = ?ocr_text, "built detection");
            detections.push(Detection::from_bbox(label, ocr_text, bbox));
        }

        Ok(detections)
    }
}
