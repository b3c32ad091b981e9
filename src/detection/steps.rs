use crate::pipeline::{PipelineData, PipelineStep, PipelineContext, MetadataValue};
use crate::detection::ocr::TextReader;
use crate::models::BBox;
use anyhow::Result;
use image::imageops::FilterType;
use std::sync::Arc;
use tracing::{debug, warn};

/// Metadata key: position of the region in the detector's output
pub const REGION_INDEX: &str = "region_index";
/// Metadata key: true when the region does not overlap the image
pub const EMPTY_CROP: &str = "empty_crop";
/// Metadata key: raw fragments produced by the text reader
pub const OCR_FRAGMENTS: &str = "ocr_fragments";

/// Crop one region per detector box - splits one image into many regions
pub struct RegionCropStep {
    pub regions: Vec<BBox>,
}

impl PipelineStep for RegionCropStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();

        for item in data {
            let img_width = i64::from(item.original.width());
            let img_height = i64::from(item.original.height());

            for (idx, region) in self.regions.iter().enumerate() {
                // Clamp to image boundaries; the detection keeps its original box
                let x1 = i64::from(region.x1).clamp(0, img_width);
                let y1 = i64::from(region.y1).clamp(0, img_height);
                let x2 = i64::from(region.x2).clamp(0, img_width);
                let y2 = i64::from(region.y2).clamp(0, img_height);
                let empty = x2 <= x1 || y2 <= y1;

                let cropped = if empty {
                    image::DynamicImage::new_rgb8(0, 0)
                } else {
                    item.original.crop_imm(x1 as u32, y1 as u32, (x2 - x1) as u32, (y2 - y1) as u32)
                };

                if empty {
                    warn!(region = idx, bbox = %region, "region lies outside the image");
                }

                let region_data = PipelineData::from_region(cropped, item.original.clone(), *region)
                    .with_metadata(REGION_INDEX, MetadataValue::Int(idx as i32))
                    .with_metadata(EMPTY_CROP, MetadataValue::Bool(empty));
                result.push(region_data);
            }
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Region Crop"
    }
}

/// Downscale crops so the longest side fits `max_side`; smaller crops are untouched
pub struct DownscaleStep {
    pub max_side: u32,
}

impl PipelineStep for DownscaleStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::with_capacity(data.len());

        for mut item in data {
            let (width, height) = (item.image.width(), item.image.height());
            let longest = width.max(height);

            if longest > self.max_side {
                let scale = self.max_side as f32 / longest as f32;
                let scaled_w = ((width as f32 * scale) as u32).max(1);
                let scaled_h = ((height as f32 * scale) as u32).max(1);
                item.image = item.image.resize_exact(scaled_w, scaled_h, FilterType::Triangle);
            }

            result.push(item);
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Downscale"
    }
}

fn read_into(reader: &dyn TextReader, data: Vec<PipelineData>) -> Vec<PipelineData> {
    let total = data.len();
    let mut result = Vec::with_capacity(total);

    for mut item in data {
        let region = item.get_int(REGION_INDEX).unwrap_or(-1);
        let fragments = if item.get_bool(EMPTY_CROP).unwrap_or(false) {
            Vec::new()
        } else {
            // A failed read leaves the region without text rather than dropping it
            reader.read(&item.image).unwrap_or_else(|e| {
                warn!(region, total, error = %e, "text reading failed");
                Vec::new()
            })
        };
        debug!(region, total, fragments = fragments.len(), reader = reader.name(), "read region");

        item.metadata.insert(OCR_FRAGMENTS.to_string(), MetadataValue::Fragments(fragments));
        result.push(item);
    }

    result
}

/// Read text from every region with a caller-supplied reader
pub struct TextReadStep {
    pub reader: Arc<dyn TextReader>,
}

impl PipelineStep for TextReadStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        Ok(read_into(self.reader.as_ref(), data))
    }

    fn name(&self) -> &str {
        "Text Reading"
    }
}

/// Run OCR on product regions with the ocrs engine
#[cfg(feature = "ocr")]
pub struct OcrStep {
    // Lazy-initialized reader, initialized once on first use
    // Using Arc so we can clone the reference and release the mutex lock
    reader: std::sync::Mutex<Option<Arc<dyn TextReader>>>,
}

#[cfg(feature = "ocr")]
impl OcrStep {
    pub fn new() -> Self {
        Self {
            reader: std::sync::Mutex::new(None),
        }
    }
}

#[cfg(feature = "ocr")]
impl Default for OcrStep {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "ocr")]
impl PipelineStep for OcrStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        // Clone the Arc to release the mutex lock before processing
        let reader = {
            let mut guard = self
                .reader
                .lock()
                .map_err(|_| anyhow::anyhow!("OCR reader lock poisoned"))?;
            guard
                .get_or_insert_with(|| match crate::detection::ocr::OcrsReader::new() {
                    Ok(reader) => {
                        debug!("OCR engine initialized successfully");
                        Arc::new(reader) as Arc<dyn TextReader>
                    }
                    Err(e) => {
                        warn!(error = %e, "OCR engine unavailable, regions will have no text");
                        Arc::new(crate::detection::ocr::NoTextReader) as Arc<dyn TextReader>
                    }
                })
                .clone()
        };

        Ok(read_into(reader.as_ref(), data))
    }

    fn name(&self) -> &str {
        "OCR Recognition"
    }
}
