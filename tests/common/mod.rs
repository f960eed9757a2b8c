mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from panelcut for tests
pub use panelcut::detection::{filter, nms, ordering};
pub use panelcut::{
    Artifact, BoundingBox, ExportError, Exporter, PanelConfig, PanelDetector, PanelError,
};
