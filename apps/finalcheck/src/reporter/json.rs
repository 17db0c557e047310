//! JSON reporter for document outcomes

use anyhow::Result;
use compliance_engine::DocumentOutcome;

/// JSON format reporter
pub struct JsonReporter;

impl JsonReporter {
    pub fn format(outcome: &DocumentOutcome, pretty: bool) -> Result<String> {
        let mut output = if pretty {
            serde_json::to_string_pretty(outcome)?
        } else {
            serde_json::to_string(outcome)?
        };
        output.push('\n');
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::tests::create_test_outcome;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_format_compact() {
        let outcome = create_test_outcome();
        let output = JsonReporter::format(&outcome, false).unwrap();

        // Only the trailing newline
        assert_eq!(output.matches('\n').count(), 1);
        assert!(output.contains("\"started_at\":\"2024-01-01T00:00:00Z\""));
    }

    #[test]
    fn test_json_format_pretty() {
        let outcome = create_test_outcome();
        let output = JsonReporter::format(&outcome, true).unwrap();

        assert!(output.contains("\n  "));
    }

    #[test]
    fn test_json_roundtrip() {
        let outcome = create_test_outcome();
        let json = JsonReporter::format(&outcome, false).unwrap();
        let parsed: DocumentOutcome = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.report, outcome.report);
        assert_eq!(parsed.pages, outcome.pages);
    }
}
