use std::path::PathBuf;
use thiserror::Error;

use crate::export::Artifact;

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid bounding box: {width}x{height} (width and height must be > 0)")]
    InvalidBox { width: u32, height: u32 },

    #[error("Bounding box ({x}, {y}) {width}x{height} exceeds image {image_width}x{image_height}")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised while persisting panel crops.
///
/// Export is fail-fast: the first failure stops the run and the error carries
/// every artifact written before it.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Panel {index} lies outside the source image: {source}")]
    OutOfBounds {
        index: usize,
        written: Vec<Artifact>,
        #[source]
        source: PanelError,
    },

    #[error("Failed to write panel {index} to {path}: {source}")]
    Write {
        index: usize,
        path: PathBuf,
        written: Vec<Artifact>,
        #[source]
        source: image::ImageError,
    },
}

impl ExportError {
    /// Artifacts persisted before the failure.
    pub fn written(&self) -> &[Artifact] {
        match self {
            ExportError::CreateDir { .. } => &[],
            ExportError::OutOfBounds { written, .. } | ExportError::Write { written, .. } => written,
        }
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to read panel {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Analysis request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Analysis service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Analysis service returned no text")]
    EmptyResponse,

    #[error("Could not parse analysis response as JSON: {message}")]
    Parse { message: String, raw: String },
}

pub type Result<T, E = PanelError> = std::result::Result<T, E>;
