use std::collections::BTreeMap;
use std::fmt;

/// One standard's outcome for one page, as reported by the analyzer.
///
/// Field names are the wire contract with the analyzer and the presentation
/// layer; do not rename them.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StandardVerdict {
    pub standard_name: String, // Registry identifier, e.g. "uniform_law_labels"
    pub is_compliant: bool,
    #[serde(default)]
    pub content_description: String,
}

impl StandardVerdict {
    pub fn new(standard_name: &str, is_compliant: bool, content_description: &str) -> Self {
        Self {
            standard_name: standard_name.to_string(),
            is_compliant,
            content_description: content_description.to_string(),
        }
    }
}

/// Why a page carries no verdicts.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageError {
    /// The analyzer could not be queried for this page.
    AnalyzerInvocation { message: String },
    /// The analyzer answered but the text did not have the expected shape.
    MalformedResponse {
        reason: String,
        raw_response: String,
    },
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageError::AnalyzerInvocation { message } => {
                write!(f, "analyzer invocation failed: {}", message)
            }
            PageError::MalformedResponse { reason, .. } => {
                write!(f, "malformed analyzer response: {}", reason)
            }
        }
    }
}

/// Reason an analyzer-returned verdict was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Identifier is not in the standard registry.
    UnknownStandard,
    /// Identifier is registered but was not part of the request.
    Unrequested,
    /// A verdict for the same standard was already accepted on this page.
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Anomaly {
    pub standard_name: String,
    pub kind: AnomalyKind,
}

/// One page's outcome. Built once by the page analyzer, then only read.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PageResult {
    pub page_number: u32, // 1-based
    pub verdicts: Vec<StandardVerdict>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<PageError>,
    /// Requested standards the analyzer said nothing about on this page.
    #[serde(default)]
    pub unanalyzed: Vec<String>,
    #[serde(default)]
    pub anomalies: Vec<Anomaly>,
}

impl PageResult {
    /// A page the analyzer answered for.
    pub fn analyzed(
        page_number: u32,
        verdicts: Vec<StandardVerdict>,
        unanalyzed: Vec<String>,
        anomalies: Vec<Anomaly>,
    ) -> Self {
        Self {
            page_number,
            verdicts,
            error: None,
            unanalyzed,
            anomalies,
        }
    }

    /// A page whose analysis failed. It carries no verdicts.
    pub fn failed(page_number: u32, error: PageError) -> Self {
        Self {
            page_number,
            verdicts: Vec::new(),
            error: Some(error),
            unanalyzed: Vec::new(),
            anomalies: Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn verdict_for<'a>(&'a self, standard: &'a str) -> Option<&'a StandardVerdict> {
        self.verdicts_for(standard).next()
    }

    /// Every verdict the page carries for `standard`, in response order.
    pub fn verdicts_for<'a>(
        &'a self,
        standard: &'a str,
    ) -> impl Iterator<Item = &'a StandardVerdict> + 'a {
        self.verdicts.iter().filter(move |v| v.standard_name == standard)
    }

    /// True only when the page has at least one verdict and all of them are
    /// compliant. A page without verdicts is never compliant.
    pub fn is_compliant(&self) -> bool {
        !self.verdicts.is_empty() && self.verdicts.iter().all(|v| v.is_compliant)
    }
}

/// Per-standard aggregation across all pages of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StandardRollup {
    pub compliant_pages: Vec<u32>,
    pub non_compliant_pages: Vec<u32>,
    /// Pages that returned no verdict for this standard.
    #[serde(default)]
    pub unanalyzed_pages: Vec<u32>,
    pub is_overall_compliant: bool,
}

impl StandardRollup {
    /// Observed somewhere, but never compliant.
    pub fn is_non_compliant_everywhere(&self) -> bool {
        self.compliant_pages.is_empty() && !self.non_compliant_pages.is_empty()
    }
}

/// Document-level compliance report.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DocumentReport {
    pub total_pages: usize,
    pub compliant_pages: usize,
    pub non_compliant_pages: usize,
    /// Keyed by standard identifier. Only standards observed on some page.
    pub checks: BTreeMap<String, StandardRollup>,
    pub overall_compliance: bool,
    /// Pages whose analysis failed (invocation or parse).
    #[serde(default)]
    pub failed_pages: Vec<u32>,
    /// Verdicts dropped across all pages.
    #[serde(default)]
    pub anomaly_count: usize,
}

impl DocumentReport {
    /// False when no page produced any verdict. `overall_compliance` is then
    /// vacuously true and should not be read as a pass.
    pub fn has_observations(&self) -> bool {
        !self.checks.is_empty()
    }

    pub fn rollup(&self, standard: &str) -> Option<&StandardRollup> {
        self.checks.get(standard)
    }

    /// Requested standards that no page reported on, in request order.
    pub fn unobserved<'a, I>(&self, requested: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        requested
            .into_iter()
            .filter(|id| !self.checks.contains_key(*id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_page_without_verdicts_is_not_compliant() {
        let page = PageResult::analyzed(1, vec![], vec!["a".to_string()], vec![]);
        assert!(!page.is_compliant());

        let failed = PageResult::failed(
            2,
            PageError::AnalyzerInvocation {
                message: "timeout".to_string(),
            },
        );
        assert!(failed.is_failed());
        assert!(!failed.is_compliant());
    }

    #[test]
    fn test_page_compliance_requires_every_verdict() {
        let page = PageResult::analyzed(
            1,
            vec![
                StandardVerdict::new("a", true, ""),
                StandardVerdict::new("b", false, ""),
            ],
            vec![],
            vec![],
        );
        assert!(!page.is_compliant());
        assert_eq!(page.verdict_for("b").map(|v| v.is_compliant), Some(false));
        assert!(page.verdict_for("c").is_none());
    }

    #[test]
    fn test_page_error_serializes_with_kind_tag() {
        let error = PageError::MalformedResponse {
            reason: "expected value".to_string(),
            raw_response: "not json".to_string(),
        };
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(json["kind"], "malformed_response");
        assert_eq!(json["raw_response"], "not json");
    }

    #[test]
    fn test_verdict_wire_names() {
        let json = r#"{"standard_name":"a","is_compliant":true,"content_description":"tag"}"#;
        let verdict: StandardVerdict = serde_json::from_str(json).unwrap();
        assert_eq!(verdict, StandardVerdict::new("a", true, "tag"));
    }

    #[test]
    fn test_unobserved_keeps_request_order() {
        let mut report = DocumentReport::default();
        report
            .checks
            .insert("b".to_string(), StandardRollup::default());

        assert_eq!(report.unobserved(["c", "b", "a"]), vec!["c", "a"]);
        assert!(report.has_observations());
        assert!(!DocumentReport::default().has_observations());
    }

    #[test]
    fn test_non_compliant_everywhere_differs_from_unobserved() {
        let rollup = StandardRollup {
            non_compliant_pages: vec![1, 2],
            ..Default::default()
        };
        assert!(rollup.is_non_compliant_everywhere());
        assert!(!StandardRollup::default().is_non_compliant_everywhere());
    }
}
