use image::DynamicImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::Result;
use tracing::debug;

use crate::models::{BBox, TextFragment};

/// One image region travelling through the pipeline, plus whatever earlier
/// steps learned about it.
#[derive(Clone)]
pub struct PipelineData {
    /// Pixels for this item, possibly cropped or resized
    pub image: DynamicImage,

    /// The full shelf image, shared between all items
    pub original: Arc<DynamicImage>,

    /// Detector box in shelf-image coordinates (None for the whole image)
    pub region: Option<BBox>,

    /// Keyed results of earlier steps (see `detection::steps` for the keys)
    pub metadata: HashMap<String, MetadataValue>,
}

#[derive(Debug, Clone)]
pub enum MetadataValue {
    Bool(bool),
    Int(i32),
    Fragments(Vec<TextFragment>),
}

impl PipelineData {
    /// Item covering the whole shelf image
    pub fn from_image(image: DynamicImage) -> Self {
        let original = Arc::new(image.clone());
        Self {
            image,
            original,
            region: None,
            metadata: HashMap::new(),
        }
    }

    /// Item for one detector box, `image` being its crop
    pub fn from_region(image: DynamicImage, original: Arc<DynamicImage>, region: BBox) -> Self {
        Self {
            image,
            original,
            region: Some(region),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.metadata.get(key) {
            Some(MetadataValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_fragments(&self, key: &str) -> Option<&[TextFragment]> {
        match self.metadata.get(key) {
            Some(MetadataValue::Fragments(v)) => Some(v.as_slice()),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Every step writes its items as PNGs into a numbered subdirectory here
    pub output_dir: PathBuf,
}

/// Shared settings visible to every step
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub debug: Option<DebugConfig>,
}

/// A stage of region processing.
///
/// A step may fan one item out into many, drop items, or rewrite them, but
/// must keep the relative order of the items it passes on: detections are
/// matched back to detector boxes by position.
pub trait PipelineStep: Send + Sync {
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>>;

    /// Shown in logs; also names the step's debug directory
    fn name(&self) -> &str;
}

/// Ordered list of steps run one after another over a shelf image.
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    /// Write intermediate crops to `output_dir`, which must be empty or not
    /// exist yet
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Feed the image through every step in order and return the final items
    pub fn run(&self, input: DynamicImage) -> Result<Vec<PipelineData>> {
        let mut data = vec![PipelineData::from_image(input)];
        if let Some(debug_config) = &self.context.debug {
            save_debug_images(&debug_config.output_dir, "00_input", &data)?;
        }

        for (step_idx, step) in self.steps.iter().enumerate() {
            debug!(step = step.name(), items = data.len(), "running step");
            data = step.process(data, &self.context)?;

            if let Some(debug_config) = &self.context.debug {
                let step_dir_name = format!(
                    "{:02}_{}",
                    step_idx + 1,
                    step.name().to_lowercase().replace(' ', "_")
                );
                save_debug_images(&debug_config.output_dir, &step_dir_name, &data)?;
            }
        }

        Ok(data)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Zero-sized crops (regions outside the image) have nothing to save.
fn save_debug_images(root: &Path, step_dir_name: &str, data: &[PipelineData]) -> Result<()> {
    let step_dir = root.join(step_dir_name);
    std::fs::create_dir_all(&step_dir)?;

    for (idx, item) in data.iter().enumerate() {
        if item.image.width() == 0 || item.image.height() == 0 {
            continue;
        }
        item.image
            .save(step_dir.join(format!("{:02}.png", idx + 1)))
            .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;
    }

    debug!(items = data.len(), dir = step_dir_name, "saved debug crops");
    Ok(())
}
