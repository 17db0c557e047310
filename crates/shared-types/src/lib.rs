pub mod types;

pub use types::{
    Anomaly, AnomalyKind, DocumentReport, PageError, PageResult, StandardRollup, StandardVerdict,
};
