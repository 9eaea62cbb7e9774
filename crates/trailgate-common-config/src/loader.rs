//! Parameter file loading and parsing.

use crate::{EnvError, PluginParams};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("missing {setting}: set parameter '{param}' or environment variable {var}")]
    Missing {
        setting: &'static str,
        param: &'static str,
        var: &'static str,
    },

    #[error(transparent)]
    Env(#[from] EnvError),
}

/// Load plugin parameters from a YAML mapping file.
pub fn load_params(path: impl AsRef<Path>) -> Result<PluginParams, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(path)?;
    PluginParams::from_yaml_str(&contents)
}

impl PluginParams {
    /// Parse parameters from a YAML mapping of scalars.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::new());
        }

        let parsed: Option<BTreeMap<String, serde_yaml::Value>> = serde_yaml::from_str(contents)
            .map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        let mut params = Self::new();
        for (key, value) in parsed.unwrap_or_default() {
            match scalar_text(&value) {
                Some(Some(text)) => params.set(&key, text),
                Some(None) => {}
                None => {
                    return Err(ConfigError::ValidationError {
                        message: format!("parameter '{}' must be a scalar", key),
                    })
                }
            }
        }
        Ok(params)
    }
}

/// Text of a scalar; `Some(None)` for null, `None` for non-scalars.
fn scalar_text(value: &serde_yaml::Value) -> Option<Option<String>> {
    use serde_yaml::Value;
    match value {
        Value::Null => Some(None),
        Value::Bool(b) => Some(Some(b.to_string())),
        Value::Number(n) => Some(Some(n.to_string())),
        Value::String(s) => Some(Some(s.clone())),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
    }
}
