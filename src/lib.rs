pub mod analysis;
pub mod config;
pub mod detection;
pub mod error;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod synthetic;

pub use config::{ExportConfig, FilterConfig, NmsConfig, PanelConfig, ThresholdConfig};
pub use detection::{PanelDetector, build_standard_pipeline, load_page};
pub use error::{AnalysisError, ExportError, PanelError};
pub use export::{Artifact, Exporter};
pub use models::{BoundingBox, Contour, PanelAnalysis};
pub use pipeline::{
    Pipeline, PipelineData, PipelineStep, PipelineContext,
    MetadataValue, DebugConfig
};
