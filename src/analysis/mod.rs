//! Per-panel content analysis.
//!
//! Detection never depends on this module. An analyzer is built from an
//! explicit [`AnalyzerConfig`]; without credentials the mock analyzer is used
//! and every panel gets a clearly marked placeholder result.

pub mod gemini;
pub mod mock;

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{info, warn};

use crate::error::AnalysisError;
use crate::export::Artifact;
use crate::models::PanelAnalysis;

pub use gemini::{GeminiAnalyzer, GeminiConfig};
pub use mock::MockAnalyzer;

/// Prompt asking for the JSON shape of [`PanelAnalysis`].
pub const DEFAULT_PROMPT: &str = r#"Analyze the provided comic panel and reply with a single JSON object of this shape:
{
  "scene_description": "An objective description of the scene, setting and atmosphere.",
  "characters": ["Each character present, with appearance and expression."],
  "actions": ["Each action or movement happening in the panel."],
  "text_ocr": "All text in the panel, including speech bubbles and sound effects, or 'No dialogue present.' if there is none."
}"#;

/// Something that can describe the content of one panel image.
#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    async fn analyze(&self, panel: &Path, prompt: &str) -> Result<PanelAnalysis, AnalysisError>;

    /// Human-readable name (used in logs)
    fn name(&self) -> &str;
}

/// How the analyzer is chosen.
#[derive(Debug, Clone, Default)]
pub enum AnalyzerConfig {
    /// No credentials: placeholder results only
    #[default]
    Unconfigured,
    Gemini(GeminiConfig),
}

impl AnalyzerConfig {
    /// Gemini with default model and endpoint when a non-empty key is given.
    pub fn from_api_key(api_key: Option<String>) -> Self {
        match api_key {
            Some(key) if !key.trim().is_empty() => AnalyzerConfig::Gemini(GeminiConfig::new(key)),
            _ => AnalyzerConfig::Unconfigured,
        }
    }

    pub fn build(self) -> Result<Box<dyn ContentAnalyzer>, AnalysisError> {
        match self {
            AnalyzerConfig::Unconfigured => {
                info!("No analysis credentials configured; panels get placeholder results");
                Ok(Box::new(MockAnalyzer))
            }
            AnalyzerConfig::Gemini(config) => Ok(Box::new(GeminiAnalyzer::new(config)?)),
        }
    }
}

/// Outcome of analyzing one exported panel.
#[derive(Debug)]
pub struct PanelReport {
    pub index: usize,
    pub path: PathBuf,
    pub result: Result<PanelAnalysis, AnalysisError>,
}

/// Analyze every panel concurrently.
///
/// Each panel succeeds or fails on its own; reports come back in artifact order.
pub async fn analyze_panels(
    analyzer: &dyn ContentAnalyzer,
    artifacts: &[Artifact],
    prompt: &str,
) -> Vec<PanelReport> {
    let jobs = artifacts.iter().map(|artifact| async move {
        let result = analyzer.analyze(&artifact.path, prompt).await;
        if let Err(e) = &result {
            warn!(
                "{} failed on panel {} ({}): {}",
                analyzer.name(),
                artifact.index,
                artifact.path.display(),
                e
            );
        }
        PanelReport {
            index: artifact.index,
            path: artifact.path.clone(),
            result,
        }
    });

    join_all(jobs).await
}

/// Default per-request timeout for remote analyzers.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Parse model output into a [`PanelAnalysis`], tolerating markdown code fences.
pub fn parse_analysis(text: &str) -> Result<PanelAnalysis, AnalysisError> {
    let cleaned = strip_code_fence(text);
    serde_json::from_str(cleaned).map_err(|e| AnalysisError::Parse {
        message: e.to_string(),
        raw: text.to_string(),
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening fence line
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches("json"),
    };
    rest.trim_end().trim_end_matches("```").trim()
}
