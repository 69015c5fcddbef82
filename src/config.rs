use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read transpiler config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid transpiler config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid transpiler config: {0}")]
    Invalid(String),
}

/// Transpiler configuration.
///
/// - `text_type` is the unbounded text type operands are cast to before `+` concatenation.
/// - `fallback_order_by` is the ordering inserted when a paginated query has no `ORDER BY`.
/// - `param_prefix` prefixes the 1-based index of every named parameter.
/// - `strict_pagination` rejects unrecognized `LIMIT` clauses instead of passing them through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranspilerConfig {
    pub text_type: String,
    pub fallback_order_by: String,
    pub param_prefix: String,
    pub strict_pagination: bool,
}

impl Default for TranspilerConfig {
    fn default() -> Self {
        Self {
            text_type: "NVARCHAR(MAX)".to_string(),
            fallback_order_by: "(SELECT NULL)".to_string(),
            param_prefix: "@p".to_string(),
            strict_pagination: false,
        }
    }
}

impl TranspilerConfig {
    /// Create default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text_type(mut self, text_type: &str) -> Self { self.text_type = text_type.to_string(); self }
    pub fn with_fallback_order_by(mut self, order_by: &str) -> Self { self.fallback_order_by = order_by.to_string(); self }
    pub fn with_param_prefix(mut self, prefix: &str) -> Self { self.param_prefix = prefix.to_string(); self }
    pub fn strict(mut self) -> Self { self.strict_pagination = true; self }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.text_type.trim().is_empty() {
            return Err(ConfigError::Invalid("text_type must not be empty".to_string()));
        }
        if self.fallback_order_by.trim().is_empty() {
            return Err(ConfigError::Invalid("fallback_order_by must not be empty".to_string()));
        }
        if !self.param_prefix.starts_with('@') || self.param_prefix.contains('?') {
            return Err(ConfigError::Invalid(format!(
                "param_prefix must start with '@' and contain no '?', got {:?}",
                self.param_prefix
            )));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
