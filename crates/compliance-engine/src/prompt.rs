//! Analysis request construction
//!
//! The instruction text produced here and the response parser in
//! `analyzer::response` are one contract: the text tells the analyzer to
//! answer with the exact shape the parser accepts, and embeds an example of
//! that shape. Change them together.

use serde::Serialize;

use shared_types::StandardVerdict;

use crate::error::ComplianceError;
use crate::products::ProductType;
use crate::standards::{StandardDefinition, StandardRegistry};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a document compliance verification assistant \
specialized in product labeling and safety standards. Your task is to analyze document images \
and determine if they comply with specific regulatory standards.";

/// The standards selected for one run and the text sent to the analyzer.
///
/// Every id is resolvable in the registry it was built against; ids are
/// unique and keep the caller's order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    standard_ids: Vec<String>,
    instruction_text: String,
    system_prompt: String,
}

impl AnalysisRequest {
    /// Build a request with the default system prompt.
    pub fn build<S: AsRef<str>>(
        registry: &StandardRegistry,
        ids: &[S],
    ) -> Result<Self, ComplianceError> {
        PromptBuilder::new(registry).build(ids)
    }

    /// Build a request for every standard the product type requires.
    pub fn for_product(
        registry: &StandardRegistry,
        product: &ProductType,
    ) -> Result<Self, ComplianceError> {
        let ids = product.required_standards();
        Self::build(registry, ids.as_slice())
    }

    pub fn standard_ids(&self) -> &[String] {
        &self.standard_ids
    }

    pub fn is_requested(&self, id: &str) -> bool {
        self.standard_ids.iter().any(|s| s == id)
    }

    pub fn instruction_text(&self) -> &str {
        &self.instruction_text
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

/// Composes `AnalysisRequest`s against one registry.
pub struct PromptBuilder<'a> {
    registry: &'a StandardRegistry,
    system_prompt: String,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(registry: &'a StandardRegistry) -> Self {
        Self {
            registry,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Validate the selection and compose the instruction text.
    ///
    /// Fails with `NoStandardsSelected` on an empty selection and with
    /// `UnknownStandard` on the first id missing from the registry. Repeated
    /// ids keep their first position.
    pub fn build<S: AsRef<str>>(&self, ids: &[S]) -> Result<AnalysisRequest, ComplianceError> {
        if ids.is_empty() {
            return Err(ComplianceError::NoStandardsSelected);
        }

        let mut standards: Vec<&StandardDefinition> = Vec::with_capacity(ids.len());
        for id in ids {
            let standard = self.registry.get(id.as_ref())?;
            if !standards.iter().any(|s| s.id == standard.id) {
                standards.push(standard);
            }
        }

        let mut text = String::from(
            "Analyze this image and determine compliance with the following standards:\n\n",
        );
        for standard in &standards {
            text.push_str(&format!("- {}: {}\n", standard.id, standard.name));
            for line in standard.criteria.lines() {
                text.push_str("  ");
                text.push_str(line);
                text.push('\n');
            }
            text.push('\n');
        }

        text.push_str("For each standard, respond in JSON format with these fields:\n");
        text.push_str("1. standard_name: the identifier of the standard exactly as listed above\n");
        text.push_str("2. is_compliant: true or false\n");
        text.push_str(
            "3. content_description: a concise description of the content you have seen in \
             the image that relates to the standard. A markdown table may be used.\n\n",
        );
        text.push_str(
            "The entire response must be a valid JSON array with one object per standard. \
             For example:\n",
        );
        text.push_str("```json\n");
        text.push_str(&example_response(
            standards.iter().map(|s| s.id.as_str()),
        ));
        text.push_str("\n```\n");

        Ok(AnalysisRequest {
            standard_ids: standards.iter().map(|s| s.id.clone()).collect(),
            instruction_text: text,
            system_prompt: self.system_prompt.clone(),
        })
    }
}

/// A response of the expected shape covering the given standards.
fn example_response<'s>(ids: impl Iterator<Item = &'s str>) -> String {
    let example: Vec<StandardVerdict> = ids
        .enumerate()
        .map(|(i, id)| {
            // Alternate outcomes
            StandardVerdict::new(
                id,
                i % 2 == 0,
                "<the content of the label, in concise text>",
            )
        })
        .collect();
    // Serializing plain structs into a String cannot fail
    serde_json::to_string_pretty(&example).unwrap_or_default()
}
