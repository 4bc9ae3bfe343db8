use serde::{Deserialize, Serialize};

use crate::types::BoundedVariable;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The declarative half of a model: everything except component logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDeclaration {
    pub module_name: String,
    pub version: String,
    pub variables: Vec<BoundedVariable>,
    #[serde(default)]
    pub failure_labels: Vec<String>,
}

pub fn parse_declaration(json: &str) -> Result<ModelDeclaration, ParseError> {
    Ok(serde_json::from_str(json)?)
}
