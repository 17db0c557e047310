//! Engine configuration
//!
//! TOML configuration for analyzer settings and extra standards:
//!
//! ```toml
//! [analyzer]
//! model = "gpt-4o"
//! detail = "high"
//! max_tokens = 1500
//! concurrency = 4
//!
//! [[standards]]
//! id = "care_label"
//! name = "Care Label"
//! criteria = "Washing and drying instructions are printed on the label"
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::standards::StandardDefinition;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub analyzer: AnalyzerSettings,
    /// Appended to the built-in standard catalog.
    #[serde(default)]
    pub standards: Vec<StandardDefinition>,
}

impl EngineConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }
}

/// Image detail level requested from the vision model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    Low,
    #[default]
    High,
}

impl ImageDetail {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageDetail::Low => "low",
            ImageDetail::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyzerSettings {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub detail: ImageDetail,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Pages analyzed at once (default: 1, strictly sequential)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Replaces the default system prompt when set.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            detail: ImageDetail::default(),
            max_tokens: default_max_tokens(),
            concurrency: default_concurrency(),
            system_prompt: None,
        }
    }
}

impl AnalyzerSettings {
    /// Concurrency clamped to at least one page in flight.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_tokens() -> u32 {
    1500
}

fn default_concurrency() -> usize {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::from_str("").unwrap();
        assert_eq!(config.analyzer, AnalyzerSettings::default());
        assert_eq!(config.analyzer.model, "gpt-4o");
        assert_eq!(config.analyzer.detail, ImageDetail::High);
        assert_eq!(config.analyzer.max_tokens, 1500);
        assert!(config.standards.is_empty());
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
            [analyzer]
            model = "gpt-4o-mini"
            detail = "low"
            max_tokens = 800
            concurrency = 4
            system_prompt = "Be strict."

            [[standards]]
            id = "care_label"
            name = "Care Label"
            criteria = "Washing instructions present"
        "#;
        let config = EngineConfig::from_str(toml).unwrap();

        assert_eq!(config.analyzer.model, "gpt-4o-mini");
        assert_eq!(config.analyzer.detail, ImageDetail::Low);
        assert_eq!(config.analyzer.effective_concurrency(), 4);
        assert_eq!(config.analyzer.system_prompt.as_deref(), Some("Be strict."));
        assert_eq!(config.standards[0].id, "care_label");
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let config = EngineConfig::from_str("[analyzer]\nconcurrency = 0\n").unwrap();
        assert_eq!(config.analyzer.effective_concurrency(), 1);
    }

    #[test]
    fn test_invalid_detail_rejected() {
        let err = EngineConfig::from_str("[analyzer]\ndetail = \"ultra\"\n").unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::from_file("/nonexistent/finalcheck.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
