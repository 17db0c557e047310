//! Label compliance analysis and aggregation
//!
//! Pipeline for one document:
//! 1. Select standards from the registry, directly or through a product type
//! 2. Build one `AnalysisRequest` (fails fast on bad input)
//! 3. Analyze every page image with a `VisionAnalyzer`, one call per page
//! 4. Aggregate the page results into a `DocumentReport`

pub mod aggregate;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod products;
pub mod prompt;
pub mod standards;

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::info;

use shared_types::{DocumentReport, PageResult};

pub use aggregate::aggregate;
pub use analyzer::{ImageFormat, PageAnalyzer, PageImage, VisionAnalyzer};
pub use config::{AnalyzerSettings, EngineConfig, ImageDetail};
pub use error::{AnalyzerError, ComplianceError};
pub use products::{ProductCatalog, ProductType};
pub use prompt::{AnalysisRequest, PromptBuilder};
pub use standards::{StandardDefinition, StandardRegistry};

/// Everything produced by one document run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentOutcome {
    pub started_at: String,
    pub standard_ids: Vec<String>,
    pub pages: Vec<PageResult>,
    pub report: DocumentReport,
}

impl DocumentOutcome {
    /// Requested standards that no page reported on.
    pub fn unobserved(&self) -> Vec<&str> {
        self.report
            .unobserved(self.standard_ids.iter().map(String::as_str))
    }
}

/// ComplianceEngine entry point
pub struct ComplianceEngine {
    registry: Arc<StandardRegistry>,
    settings: AnalyzerSettings,
}

impl ComplianceEngine {
    pub fn new() -> Self {
        Self {
            registry: StandardRegistry::shared(),
            settings: AnalyzerSettings::default(),
        }
    }

    pub fn with_registry(registry: Arc<StandardRegistry>, settings: AnalyzerSettings) -> Self {
        Self { registry, settings }
    }

    /// Built-in standards plus any configured ones.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ComplianceError> {
        let registry = if config.standards.is_empty() {
            StandardRegistry::shared()
        } else {
            Arc::new(StandardRegistry::builtin().with_additional(config.standards.clone())?)
        };
        Ok(Self::with_registry(registry, config.analyzer.clone()))
    }

    pub fn registry(&self) -> &StandardRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    pub fn request<S: AsRef<str>>(&self, ids: &[S]) -> Result<AnalysisRequest, ComplianceError> {
        let mut builder = PromptBuilder::new(&self.registry);
        if let Some(prompt) = &self.settings.system_prompt {
            builder = builder.system_prompt(prompt.clone());
        }
        builder.build(ids)
    }

    pub fn request_for_product(&self, key: &str) -> Result<AnalysisRequest, ComplianceError> {
        let product = ProductCatalog::get(key)?;
        let ids = product.required_standards();
        self.request(ids.as_slice())
    }

    /// Analyze pages in order, up to `concurrency` at a time. Results keep
    /// page order whatever order the analyzer answers in.
    pub async fn analyze_pages<A>(
        &self,
        analyzer: &A,
        request: &AnalysisRequest,
        pages: &[PageImage],
    ) -> Vec<PageResult>
    where
        A: VisionAnalyzer + ?Sized,
    {
        let page_analyzer = PageAnalyzer::new(&self.registry, request);
        let page_analyzer = &page_analyzer;

        stream::iter(pages.iter().enumerate())
            .map(move |(index, image)| page_analyzer.analyze(analyzer, (index + 1) as u32, image))
            .buffered(self.settings.effective_concurrency())
            .collect()
            .await
    }

    /// Analyze all pages against a prepared request and aggregate.
    pub async fn run<A>(
        &self,
        analyzer: &A,
        request: &AnalysisRequest,
        pages: &[PageImage],
    ) -> DocumentOutcome
    where
        A: VisionAnalyzer + ?Sized,
    {
        let started_at = Utc::now().to_rfc3339();
        info!(
            pages = pages.len(),
            standards = request.standard_ids().len(),
            concurrency = self.settings.effective_concurrency(),
            "Starting compliance check"
        );

        let results = self.analyze_pages(analyzer, request, pages).await;
        let report = aggregate(&results);

        info!(
            overall_compliance = report.overall_compliance,
            compliant_pages = report.compliant_pages,
            non_compliant_pages = report.non_compliant_pages,
            failed_pages = report.failed_pages.len(),
            "Compliance check complete"
        );

        DocumentOutcome {
            started_at,
            standard_ids: request.standard_ids().to_vec(),
            pages: results,
            report,
        }
    }

    /// Validate the selection, then analyze and aggregate.
    ///
    /// Selection errors are returned before the analyzer is called.
    pub async fn check_document<A, S>(
        &self,
        analyzer: &A,
        ids: &[S],
        pages: &[PageImage],
    ) -> Result<DocumentOutcome, ComplianceError>
    where
        A: VisionAnalyzer + ?Sized,
        S: AsRef<str>,
    {
        let request = self.request(ids)?;
        Ok(self.run(analyzer, &request, pages).await)
    }
}

impl Default for ComplianceEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standards::{CALIFORNIA_FLAMMABILITY, UNIFORM_LAW_LABELS};

    #[test]
    fn test_engine_uses_configured_system_prompt() {
        let config = EngineConfig::from_str("[analyzer]\nsystem_prompt = \"Only JSON.\"\n").unwrap();
        let engine = ComplianceEngine::from_config(&config).unwrap();
        let request = engine.request(&[UNIFORM_LAW_LABELS]).unwrap();
        assert_eq!(request.system_prompt(), "Only JSON.");
    }

    #[test]
    fn test_engine_registers_configured_standards() {
        let config = EngineConfig::from_str(
            "[[standards]]\nid = \"care_label\"\nname = \"Care Label\"\ncriteria = \"Care symbols\"\n",
        )
        .unwrap();
        let engine = ComplianceEngine::from_config(&config).unwrap();
        assert!(engine.registry().contains("care_label"));
        assert!(engine.request(&["care_label"]).is_ok());
    }

    #[test]
    fn test_engine_rejects_duplicate_configured_standard() {
        let config = EngineConfig::from_str(
            "[[standards]]\nid = \"uniform_law_labels\"\nname = \"x\"\ncriteria = \"y\"\n",
        )
        .unwrap();
        assert!(matches!(
            ComplianceEngine::from_config(&config),
            Err(ComplianceError::DuplicateStandard(_))
        ));
    }

    #[test]
    fn test_request_for_product() {
        let engine = ComplianceEngine::new();
        let request = engine.request_for_product("cushion").unwrap();
        assert!(request.is_requested(CALIFORNIA_FLAMMABILITY));
        assert_eq!(
            engine.request_for_product("sofa").unwrap_err(),
            ComplianceError::UnknownProductType("sofa".to_string())
        );
    }
}
