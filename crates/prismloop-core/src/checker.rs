//! Interface to an external probabilistic model checker.
//!
//! Nothing here runs a checker; callers supply a [`ModelChecker`] that does.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum CheckerError {
    #[error("Model checker failed: {0}")]
    Failed(String),

    #[error("Model checker I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One property-checking job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRequest {
    /// Materialized model file.
    pub model: PathBuf,
    /// Property file.
    pub property: PathBuf,
    pub replications: u32,
    /// Values for the model's undefined constants (at least `N`).
    pub constants: BTreeMap<String, i64>,
}

/// Result reported by the checker for one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Verdict {
    Satisfied,
    Violated,
    Probability(f64),
}

pub trait ModelChecker {
    fn check(&self, request: &CheckRequest) -> Result<Verdict, CheckerError>;
}
