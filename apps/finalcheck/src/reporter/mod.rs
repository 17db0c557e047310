//! Compliance report output
//!
//! - **Json**: machine-readable, compact or pretty
//! - **Console**: human-readable summary with per-page detail

mod console;
mod json;

use anyhow::Result;
use std::io::{self, Write};

use compliance_engine::DocumentOutcome;

pub use console::ConsoleReporter;
pub use json::JsonReporter;

/// Output format for document outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON format for machine parsing
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Console output
    #[default]
    Console,
}

pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Report the outcome to stdout
    pub fn report(&self, outcome: &DocumentOutcome) -> Result<()> {
        let output = self.format_outcome(outcome)?;
        print!("{}", output);
        io::stdout().flush()?;
        Ok(())
    }

    pub fn format_outcome(&self, outcome: &DocumentOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => JsonReporter::format(outcome, false),
            OutputFormat::JsonPretty => JsonReporter::format(outcome, true),
            OutputFormat::Console => ConsoleReporter::format(outcome),
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use compliance_engine::aggregate;
    use shared_types::{PageError, PageResult, StandardVerdict};

    pub(crate) fn create_test_outcome() -> DocumentOutcome {
        let pages = vec![
            PageResult::analyzed(
                1,
                vec![StandardVerdict::new(
                    "uniform_law_labels",
                    true,
                    "REG. NO. PA-12345 (KR)",
                )],
                vec!["california_flammability".to_string()],
                vec![],
            ),
            PageResult::failed(
                2,
                PageError::AnalyzerInvocation {
                    message: "timeout".to_string(),
                },
            ),
        ];
        let report = aggregate(&pages);
        DocumentOutcome {
            started_at: "2024-01-01T00:00:00Z".to_string(),
            standard_ids: vec![
                "uniform_law_labels".to_string(),
                "california_flammability".to_string(),
            ],
            pages,
            report,
        }
    }

    #[test]
    fn test_reporter_json_format() {
        let outcome = create_test_outcome();
        let output = Reporter::new(OutputFormat::Json)
            .format_outcome(&outcome)
            .unwrap();

        assert!(output.contains("uniform_law_labels"));
        assert!(output.contains("\"overall_compliance\":true"));
    }

    #[test]
    fn test_reporter_console_format() {
        let outcome = create_test_outcome();
        let output = Reporter::new(OutputFormat::Console)
            .format_outcome(&outcome)
            .unwrap();

        assert!(output.contains("uniform_law_labels"));
        assert!(output.contains("Page 2"));
    }

    #[test]
    fn test_default_format() {
        let reporter = Reporter::default();
        assert_eq!(reporter.format, OutputFormat::Console);
    }
}
