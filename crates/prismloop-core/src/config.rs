//! Assembly configuration: output location, formatting, expansion mode and
//! probability checking.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use prismloop_ir::printer::DEFAULT_INDENT;

/// What to do with transitions whose probabilities do not sum to 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbabilityCheck {
    /// Emit whatever the components produce.
    Off,
    /// Log each offending transition and keep going.
    #[default]
    Warn,
    /// Fail assembly.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Directory `save_to_file` writes into (default: `./bin`).
    pub output_dir: PathBuf,
    /// Prefix of every line inside the module block.
    pub indent: String,
    /// Emit the `// Generated:` header line. Disable for reproducible output.
    pub timestamp: bool,
    /// Expand components on the rayon thread pool. Output order is unchanged.
    pub parallel_expansion: bool,
    pub probability_check: ProbabilityCheck,
    /// Allowed deviation of a transition's total probability from 1.
    pub probability_tolerance: f64,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./bin"),
            indent: DEFAULT_INDENT.to_string(),
            timestamp: true,
            parallel_expansion: false,
            probability_check: ProbabilityCheck::Warn,
            probability_tolerance: 1e-6,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AssemblyConfig {
    /// Parse a JSON config; omitted fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AssemblyConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("./bin"));
        assert_eq!(config.indent, "  ");
        assert!(config.timestamp);
        assert!(!config.parallel_expansion);
        assert_eq!(config.probability_check, ProbabilityCheck::Warn);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            AssemblyConfig::from_json(r#"{ "timestamp": false, "probability_check": "strict" }"#)
                .unwrap();
        assert!(!config.timestamp);
        assert_eq!(config.probability_check, ProbabilityCheck::Strict);
        assert_eq!(config.indent, "  ");
        assert_eq!(config.probability_tolerance, 1e-6);
    }

    #[test]
    fn test_unknown_check_mode_is_rejected() {
        assert!(AssemblyConfig::from_json(r#"{ "probability_check": "sometimes" }"#).is_err());
    }
}
