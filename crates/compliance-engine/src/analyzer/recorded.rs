//! Replay of recorded analyzer responses
//!
//! Lets a run be reproduced offline from a JSON file with one entry per page:
//!
//! ```json
//! [
//!   "[{\"standard_name\": \"uniform_law_labels\", \"is_compliant\": true, \"content_description\": \"...\"}]",
//!   { "error": "upstream timeout" }
//! ]
//! ```

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::{ImageFormat, PageImage, VisionAnalyzer};
use crate::error::AnalyzerError;
use crate::prompt::AnalysisRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordedResponse {
    /// Raw response text, exactly as the analyzer returned it.
    Text(String),
    /// The invocation failed with this message.
    Failure { error: String },
}

/// Analyzer that answers page N with the N-th recorded response.
#[derive(Debug, Clone, Default)]
pub struct RecordedAnalyzer {
    responses: Vec<RecordedResponse>,
}

impl RecordedAnalyzer {
    pub fn new(responses: Vec<RecordedResponse>) -> Self {
        Self { responses }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read recorded responses: {}", path.display()))?;
        Self::from_json(&content)
    }

    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        let responses = serde_json::from_str(s).context("Failed to parse recorded responses")?;
        Ok(Self { responses })
    }

    pub fn page_count(&self) -> usize {
        self.responses.len()
    }

    /// Stand-in images, one per recorded page. Their content is never read.
    pub fn placeholder_pages(&self) -> Vec<PageImage> {
        (0..self.responses.len())
            .map(|_| PageImage::new(ImageFormat::Png, Vec::new()))
            .collect()
    }
}

#[async_trait]
impl VisionAnalyzer for RecordedAnalyzer {
    async fn analyze(
        &self,
        page_number: u32,
        _image: &PageImage,
        _request: &AnalysisRequest,
    ) -> Result<String, AnalyzerError> {
        let index = (page_number as usize).checked_sub(1);
        match index.and_then(|i| self.responses.get(i)) {
            Some(RecordedResponse::Text(text)) => Ok(text.clone()),
            Some(RecordedResponse::Failure { error }) => {
                Err(AnalyzerError::Unavailable(error.clone()))
            }
            None => Err(AnalyzerError::Unavailable(format!(
                "no recorded response for page {}",
                page_number
            ))),
        }
    }
}
