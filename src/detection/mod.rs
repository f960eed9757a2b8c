pub mod preprocessing;
pub mod contours;
pub mod filter;
pub mod nms;
pub mod ordering;
pub mod steps;

use std::path::Path;

use image::{DynamicImage, ImageReader};
use tracing::debug;

use crate::config::PanelConfig;
use crate::error::{PanelError, Result};
use crate::export::{Artifact, Exporter};
use crate::models::BoundingBox;

/// Decode a page from disk.
///
/// Unreadable or undecodable files fail with [`PanelError::Decode`], which keeps
/// the path and the underlying `image` error; a decoded image with a zero
/// dimension fails with [`PanelError::InvalidImage`].
pub fn load_page(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let path = path.as_ref();
    let decode_error = |source: image::ImageError| PanelError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let img = ImageReader::open(path)
        .map_err(|e| decode_error(image::ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| decode_error(image::ImageError::IoError(e)))?
        .decode()
        .map_err(decode_error)?;

    if img.width() == 0 || img.height() == 0 {
        return Err(PanelError::InvalidImage(format!(
            "{} has zero dimension ({}x{})",
            path.display(),
            img.width(),
            img.height()
        )));
    }
    Ok(img)
}

/// Panel detection orchestrator
#[derive(Debug, Clone)]
pub struct PanelDetector {
    config: PanelConfig,
}

impl PanelDetector {
    pub fn new(config: PanelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Run detection on a page and return the panels in reading order
    pub fn detect(&self, img: &DynamicImage) -> Result<Vec<BoundingBox>> {
        let filtered = self.get_filtered(img)?;

        let kept = nms::non_max_suppression(&filtered, self.config.nms.overlap_thresh);
        debug!(
            "Suppression kept {} of {} boxes (threshold {})",
            kept.len(),
            filtered.len(),
            self.config.nms.overlap_thresh
        );

        let ordered = ordering::sort_reading_order(&kept);
        for (i, b) in ordered.iter().enumerate() {
            debug!(
                "  Panel {}: ({}, {}) {}x{}",
                i + 1,
                b.x(),
                b.y(),
                b.width(),
                b.height()
            );
        }

        Ok(ordered)
    }

    /// Detect panels and write each one out with `exporter`
    pub fn extract(&self, img: &DynamicImage, exporter: &Exporter) -> anyhow::Result<Vec<Artifact>> {
        let panels = self.detect(img)?;
        if panels.is_empty() {
            debug!("No panels detected");
        }
        Ok(exporter.export(img, &panels)?)
    }

    /// Get the binary mask of a page (for debugging)
    pub fn get_mask(&self, img: &DynamicImage) -> Result<image::GrayImage> {
        debug!("Binarizing {}x{} page", img.width(), img.height());
        preprocessing::binarize(img, &self.config.threshold)
    }

    /// Get every external region box of a page (for debugging)
    pub fn get_candidates(&self, img: &DynamicImage) -> Result<Vec<BoundingBox>> {
        let mask = self.get_mask(img)?;
        let candidates = contours::extract_regions(&mask);
        debug!("Found {} candidate regions", candidates.len());
        Ok(candidates)
    }

    /// Get the candidates that pass the size filter (for debugging)
    pub fn get_filtered(&self, img: &DynamicImage) -> Result<Vec<BoundingBox>> {
        let candidates = self.get_candidates(img)?;
        let filtered =
            filter::filter_boxes(&candidates, img.width(), img.height(), &self.config.filter);
        debug!(
            "Size filter kept {} of {} candidates",
            filtered.len(),
            candidates.len()
        );
        Ok(filtered)
    }
}

impl Default for PanelDetector {
    fn default() -> Self {
        Self {
            config: PanelConfig::default(),
        }
    }
}

/// Build the standard panel pipeline using the composable pipeline system
pub fn build_standard_pipeline(config: &PanelConfig) -> crate::pipeline::Pipeline {
    use crate::pipeline::Pipeline;
    use crate::detection::steps::*;
    use std::sync::Arc;

    Pipeline::new()
        .add_step(Arc::new(BinarizeStep {
            config: config.threshold.clone(),
        }))
        .add_step(Arc::new(RegionExtractionStep))
        .add_step(Arc::new(BoxFilterStep {
            config: config.filter.clone(),
        }))
        .add_step(Arc::new(SuppressionStep {
            overlap_thresh: config.nms.overlap_thresh,
        }))
        .add_step(Arc::new(ReadingOrderStep))
        .add_step(Arc::new(CropStep))
}
