//! Error types for the compliance engine
//!
//! Only caller-input problems are errors. Anything that goes wrong while a
//! single page is being analyzed is recorded on that page's `PageResult`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComplianceError {
    #[error("Unknown standard: {0}")]
    UnknownStandard(String),

    #[error("No standards selected")]
    NoStandardsSelected,

    #[error("Duplicate standard in registry: {0}")]
    DuplicateStandard(String),

    #[error("Standard identifier must not be empty")]
    EmptyStandardId,

    #[error("Unknown product type: {0}")]
    UnknownProductType(String),
}

/// Failure of the external vision analyzer for one invocation.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Analyzer unavailable: {0}")]
    Unavailable(String),

    #[error("Analyzer rejected the request: {0}")]
    Rejected(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
