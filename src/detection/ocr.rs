use image::DynamicImage;

use crate::models::TextFragment;

/// Anything that can read text fragments from a product crop.
pub trait TextReader: Send + Sync {
    fn read(&self, region: &DynamicImage) -> anyhow::Result<Vec<TextFragment>>;

    fn name(&self) -> &str;
}

/// Reader used when no OCR engine is available: every region reads as empty,
/// so every detection ends up labelled "unknown".
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTextReader;

impl TextReader for NoTextReader {
    fn read(&self, _region: &DynamicImage) -> anyhow::Result<Vec<TextFragment>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "none"
    }
}

#[cfg(feature = "ocr")]
pub use engine::{init_ocr_engine, OcrsReader, OCRS_LINE_CONFIDENCE};

#[cfg(feature = "ocr")]
mod engine {
    use std::path::Path;

    use image::DynamicImage;
    use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
    use rten::Model;

    use super::TextReader;
    use crate::models::TextFragment;

    /// `get_text` reports no per-line confidence; lines are given this value.
    pub const OCRS_LINE_CONFIDENCE: f32 = 0.9;

    /// Initialize OCR engine with models from standard cache location
    pub fn init_ocr_engine() -> anyhow::Result<OcrEngine> {
        let home_dir = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))?;

        let cache_dir = Path::new(&home_dir).join(".cache/ocrs");
        let detection_model_path = cache_dir.join("text-detection.rten");
        let recognition_model_path = cache_dir.join("text-recognition.rten");

        if !detection_model_path.exists() || !recognition_model_path.exists() {
            anyhow::bail!(
                "OCR models not found. Please run: ocrs-cli --help (or download models manually)\n\
                 Expected locations:\n  - {}\n  - {}",
                detection_model_path.display(),
                recognition_model_path.display()
            );
        }

        let detection_model = Model::load_file(&detection_model_path)?;
        let recognition_model = Model::load_file(&recognition_model_path)?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })?;

        Ok(engine)
    }

    /// Text reader backed by the `ocrs` engine; each recognized line becomes
    /// one fragment.
    pub struct OcrsReader {
        engine: OcrEngine,
    }

    impl OcrsReader {
        pub fn new() -> anyhow::Result<Self> {
            Ok(Self {
                engine: init_ocr_engine()?,
            })
        }
    }

    impl TextReader for OcrsReader {
        fn read(&self, region: &DynamicImage) -> anyhow::Result<Vec<TextFragment>> {
            let img = region.to_rgb8();
            let img_source = ImageSource::from_bytes(img.as_raw(), img.dimensions())
                .map_err(|e| anyhow::anyhow!("Invalid OCR input image: {:?}", e))?;
            let ocr_input = self.engine.prepare_input(img_source)?;
            let text = self.engine.get_text(&ocr_input)?;

            Ok(text
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| TextFragment::new(line, OCRS_LINE_CONFIDENCE))
                .collect())
        }

        fn name(&self) -> &str {
            "ocrs"
        }
    }
}
