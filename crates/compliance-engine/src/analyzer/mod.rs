//! Page analyzer adapter
//!
//! Wraps the external vision analyzer: one invocation per page, output
//! normalized into a `PageResult`. Nothing that happens to one page can fail
//! the run; invocation and parse failures are recorded on the page.

pub mod payload;
pub mod recorded;
pub mod response;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use shared_types::{Anomaly, AnomalyKind, PageError, PageResult, StandardVerdict};

use crate::error::AnalyzerError;
use crate::prompt::AnalysisRequest;
use crate::standards::StandardRegistry;

pub use payload::ChatPayload;
pub use recorded::{RecordedAnalyzer, RecordedResponse};
pub use response::{parse_response, ParseOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }
}

/// One rendered page, as produced by the rasterizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl PageImage {
    pub fn new(format: ImageFormat, bytes: Vec<u8>) -> Self {
        Self { format, bytes }
    }

    /// `data:` URL with the base64-encoded image, as accepted by chat APIs.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// The external vision capability: image + instructions in, raw text out.
///
/// Implementations own their transport, timeouts and retry policy. The page
/// number is informational.
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        page_number: u32,
        image: &PageImage,
        request: &AnalysisRequest,
    ) -> Result<String, AnalyzerError>;
}

/// Turns analyzer output into `PageResult`s for one request.
pub struct PageAnalyzer<'a> {
    registry: &'a StandardRegistry,
    request: &'a AnalysisRequest,
}

impl<'a> PageAnalyzer<'a> {
    pub fn new(registry: &'a StandardRegistry, request: &'a AnalysisRequest) -> Self {
        Self { registry, request }
    }

    /// Invoke the analyzer exactly once for this page.
    pub async fn analyze<A>(&self, analyzer: &A, page_number: u32, image: &PageImage) -> PageResult
    where
        A: VisionAnalyzer + ?Sized,
    {
        debug!(page = page_number, "Analyzing page");
        match analyzer.analyze(page_number, image, self.request).await {
            Ok(raw) => self.interpret(page_number, &raw),
            Err(e) => {
                warn!(page = page_number, error = %e, "Analyzer invocation failed");
                PageResult::failed(
                    page_number,
                    PageError::AnalyzerInvocation {
                        message: e.to_string(),
                    },
                )
            }
        }
    }

    /// Build the page result from a raw analyzer response.
    pub fn interpret(&self, page_number: u32, raw: &str) -> PageResult {
        let returned = match parse_response(raw) {
            ParseOutcome::Parsed(verdicts) => verdicts,
            ParseOutcome::Unparseable { raw, reason } => {
                warn!(page = page_number, %reason, "Could not parse analyzer response");
                return PageResult::failed(
                    page_number,
                    PageError::MalformedResponse {
                        reason,
                        raw_response: raw,
                    },
                );
            }
        };

        let mut verdicts: Vec<StandardVerdict> = Vec::with_capacity(returned.len());
        let mut anomalies = Vec::new();
        for verdict in returned {
            let anomaly = if !self.registry.contains(&verdict.standard_name) {
                Some(AnomalyKind::UnknownStandard)
            } else if !self.request.is_requested(&verdict.standard_name) {
                Some(AnomalyKind::Unrequested)
            } else if verdicts
                .iter()
                .any(|v| v.standard_name == verdict.standard_name)
            {
                Some(AnomalyKind::Duplicate)
            } else {
                None
            };

            match anomaly {
                Some(kind) => {
                    warn!(
                        page = page_number,
                        standard = %verdict.standard_name,
                        ?kind,
                        "Dropping analyzer verdict"
                    );
                    anomalies.push(Anomaly {
                        standard_name: verdict.standard_name,
                        kind,
                    });
                }
                None => verdicts.push(verdict),
            }
        }

        let unanalyzed: Vec<String> = self
            .request
            .standard_ids()
            .iter()
            .filter(|id| !verdicts.iter().any(|v| &v.standard_name == *id))
            .cloned()
            .collect();
        if !unanalyzed.is_empty() {
            debug!(page = page_number, ?unanalyzed, "Standards not evaluated on page");
        }

        PageResult::analyzed(page_number, verdicts, unanalyzed, anomalies)
    }
}
