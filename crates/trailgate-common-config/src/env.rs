//! Environment variable handling.

use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("failed to load .env file: {0}")]
    DotenvError(#[from] dotenvy::Error),
}

/// Environment variable names.
pub mod vars {
    pub const CHANNEL_ARN: &str = "TRAILGATE_CHANNEL_ARN";
    /// Channel variable read by the CloudTrail Data output plugin.
    pub const CLOUDTRAIL_DATA_CHANNEL_ARN: &str = "AWS_CLOUDTRAIL_DATA_CHANNELARN";
    pub const ENDPOINT: &str = "TRAILGATE_ENDPOINT";
    pub const API_TOKEN: &str = "TRAILGATE_API_TOKEN";
    pub const EXTERNAL_ID: &str = "TRAILGATE_EXTERNAL_ID";
    pub const LOG_LEVEL: &str = "TRAILGATE_LOG_LEVEL";
    pub const TIMEOUT_SECS: &str = "TRAILGATE_TIMEOUT_SECS";
}

/// A source of environment-style variables.
pub trait VarSource {
    /// Look up a variable; unset and blank values are `None`.
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct Environment;

impl Environment {
    /// Load `.env` then `.env.local` into the process environment.
    ///
    /// Missing files are fine; unreadable or malformed ones are not.
    pub fn load_dotenv() -> Result<(), EnvError> {
        for file in [".env", ".env.local"] {
            match dotenvy::from_filename(file) {
                Ok(_) => {}
                Err(e) if e.not_found() => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

impl VarSource for Environment {
    fn var(&self, name: &str) -> Option<String> {
        env::var(name).ok().filter(|v| !v.trim().is_empty())
    }
}

impl VarSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).filter(|v| !v.trim().is_empty()).cloned()
    }
}

/// Parse an integer variable from any source.
pub fn get_int<T: std::str::FromStr>(source: &impl VarSource, var: &str) -> Result<Option<T>, EnvError> {
    match source.var(var) {
        Some(v) => v.trim().parse().map(Some).map_err(|_| EnvError::InvalidValue {
            var: var.to_string(),
            message: format!("expected integer, got '{}'", v),
        }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_blank_values_are_unset() {
        let lookup = source(&[(vars::ENDPOINT, "  ")]);
        assert_eq!(lookup.var(vars::ENDPOINT), None);
    }

    #[test]
    fn test_get_int() {
        let lookup = source(&[(vars::TIMEOUT_SECS, "15"), ("BAD", "soon")]);
        assert_eq!(get_int::<u64>(&lookup, vars::TIMEOUT_SECS).unwrap(), Some(15));
        assert_eq!(get_int::<u64>(&lookup, "MISSING").unwrap(), None);
        assert!(matches!(
            get_int::<u64>(&lookup, "BAD"),
            Err(EnvError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_process_environment_unset_variable() {
        assert_eq!(Environment.var("TRAILGATE_TEST_SURELY_UNSET_9F2C"), None);
    }
}
