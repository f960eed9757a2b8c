use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{PanelError, Result};

/// Placeholder substituted with the 1-based panel index in export file names.
pub const INDEX_PLACEHOLDER: &str = "{index}";

/// Local adaptive mean thresholding parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Side of the square averaging window, odd and at least 3
    pub block_size: u32,
    /// Constant subtracted from the local mean
    pub bias: i32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            block_size: 11,
            bias: 2,
        }
    }
}

impl ThresholdConfig {
    pub fn validate(&self) -> Result<()> {
        if self.block_size < 3 || self.block_size % 2 == 0 {
            return Err(PanelError::InvalidConfig(format!(
                "threshold block size must be odd and >= 3, got {}",
                self.block_size
            )));
        }
        Ok(())
    }
}

/// Size limits a candidate must satisfy to count as a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub min_dim: u32,
    pub min_area_frac: f64,
    pub max_area_frac: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_dim: 50,
            min_area_frac: 0.01,
            max_area_frac: 0.90,
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        if !in_range(self.min_area_frac) || !in_range(self.max_area_frac) {
            return Err(PanelError::InvalidConfig(format!(
                "area fractions must lie in [0, 1], got min={} max={}",
                self.min_area_frac, self.max_area_frac
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NmsConfig {
    pub overlap_thresh: f64,
}

impl Default for NmsConfig {
    fn default() -> Self {
        Self {
            overlap_thresh: 0.3,
        }
    }
}

impl NmsConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.overlap_thresh) {
            return Err(PanelError::InvalidConfig(format!(
                "overlap threshold must lie in [0, 1], got {}",
                self.overlap_thresh
            )));
        }
        Ok(())
    }
}

/// Where and under which names panel crops are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    /// File name with an `{index}` placeholder; the extension picks the encoder
    pub file_template: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("extracted_panels"),
            file_template: "panel_{index}.png".to_string(),
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.file_template.contains(INDEX_PLACEHOLDER) {
            return Err(PanelError::InvalidConfig(format!(
                "file template {:?} must contain {INDEX_PLACEHOLDER}",
                self.file_template
            )));
        }
        if self.file_template.contains(['/', '\\']) {
            return Err(PanelError::InvalidConfig(format!(
                "file template {:?} must be a plain file name",
                self.file_template
            )));
        }
        match image::ImageFormat::from_path(self.file_name(1)) {
            Ok(format) if format.writing_enabled() => Ok(()),
            _ => Err(PanelError::InvalidConfig(format!(
                "file template {:?} needs an extension of a writable image format",
                self.file_template
            ))),
        }
    }

    /// File name for the panel at 1-based `index`.
    pub fn file_name(&self, index: usize) -> String {
        self.file_template
            .replace(INDEX_PLACEHOLDER, &index.to_string())
    }
}

/// Every tunable of the panel extraction pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub threshold: ThresholdConfig,
    pub filter: FilterConfig,
    pub nms: NmsConfig,
    pub export: ExportConfig,
}

impl PanelConfig {
    /// Load a JSON config file; missing fields fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: PanelConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.threshold.validate()?;
        self.filter.validate()?;
        self.nms.validate()?;
        self.export.validate()
    }
}
