pub mod annotate;
pub mod arrangement;
pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod report;

pub use models::{BBox, Detection, Status, TextFragment, Verdict, UNKNOWN_LABEL};
pub use arrangement::{check_arrangement, ArrangementChecker, ArrangementReport, RowAnalysis};
pub use config::ShelfConfig;
pub use detection::DetectionSupplier;
pub use error::{ArrangementError, ArrangementResult};
pub use pipeline::{
    Pipeline, PipelineData, PipelineStep, PipelineContext, MetadataValue, DebugConfig
};
pub use report::ShelfReport;
