use std::path::Path;

use async_trait::async_trait;

use crate::analysis::ContentAnalyzer;
use crate::error::AnalysisError;
use crate::models::PanelAnalysis;

/// Stand-in used when no analysis service is configured.
///
/// Always succeeds with the same placeholder, flagged `mock: true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockAnalyzer;

impl MockAnalyzer {
    pub fn placeholder() -> PanelAnalysis {
        PanelAnalysis {
            scene_description: "Placeholder: no analysis service configured.".to_string(),
            characters: vec!["N/A".to_string()],
            actions: vec!["N/A".to_string()],
            text_ocr: "Provide an API key to get a real analysis.".to_string(),
            mock: true,
        }
    }
}

#[async_trait]
impl ContentAnalyzer for MockAnalyzer {
    async fn analyze(&self, _panel: &Path, _prompt: &str) -> Result<PanelAnalysis, AnalysisError> {
        Ok(Self::placeholder())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_marked_placeholder_without_touching_disk() {
        let analysis = MockAnalyzer
            .analyze(Path::new("/does/not/exist.png"), "describe")
            .await
            .unwrap();
        assert!(analysis.mock);
        assert_eq!(analysis, MockAnalyzer::placeholder());
    }
}
