//! Resolved forwarder settings.

use crate::env::{get_int, vars, Environment, VarSource};
use crate::{ApiToken, ConfigError, PluginParams};
use std::time::Duration;
use trailgate_audit_types::EventTemplate;
use trailgate_common_log::LogLevel;

/// Plugin parameter names.
pub mod keys {
    pub const CHANNEL_ARN: &str = "ChannelArn";
    pub const ENDPOINT: &str = "Endpoint";
    pub const API_TOKEN: &str = "ApiToken";
    pub const EXTERNAL_ID: &str = "ExternalId";
    pub const LOG_LEVEL: &str = "log_level";
    pub const TIMEOUT: &str = "Timeout";
}

/// Request timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable settings for one forwarder instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwarderConfig {
    /// Destination channel identifier.
    pub channel: String,
    /// Base URL of the audit ingestion service.
    pub endpoint: String,
    /// Bearer token for the ingestion service.
    pub api_token: Option<ApiToken>,
    /// Identifier passed along with every submission.
    pub external_id: Option<String>,
    /// Diagnostic verbosity.
    pub log_level: LogLevel,
    /// Request timeout for remote calls.
    pub timeout: Duration,
    /// Fixed envelope metadata.
    pub template: EventTemplate,
}

impl ForwarderConfig {
    /// Settings with defaults for everything optional.
    pub fn new(channel: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            endpoint: endpoint.into(),
            api_token: None,
            external_id: None,
            log_level: LogLevel::default(),
            timeout: DEFAULT_TIMEOUT,
            template: EventTemplate::default(),
        }
    }

    /// Resolve from plugin parameters, falling back to the process environment.
    pub fn from_params(params: &PluginParams) -> Result<Self, ConfigError> {
        Self::resolve(params, &Environment)
    }

    /// Resolve from plugin parameters, falling back to `env`.
    ///
    /// Channel and endpoint are required; everything else has a default.
    pub fn resolve(params: &PluginParams, env: &impl VarSource) -> Result<Self, ConfigError> {
        let lookup = |param: &str, var: &str| {
            params
                .get(param)
                .map(|v| v.trim().to_string())
                .or_else(|| env.var(var).map(|v| v.trim().to_string()))
        };

        let channel = lookup(keys::CHANNEL_ARN, vars::CHANNEL_ARN)
            .or_else(|| {
                env.var(vars::CLOUDTRAIL_DATA_CHANNEL_ARN)
                    .map(|v| v.trim().to_string())
            })
            .ok_or(ConfigError::Missing {
                setting: "channel",
                param: keys::CHANNEL_ARN,
                var: vars::CHANNEL_ARN,
            })?;

        let endpoint = lookup(keys::ENDPOINT, vars::ENDPOINT).ok_or(ConfigError::Missing {
            setting: "endpoint",
            param: keys::ENDPOINT,
            var: vars::ENDPOINT,
        })?;
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::ValidationError {
                message: format!("endpoint must be an http(s) URL, got '{}'", endpoint),
            });
        }

        let log_level = lookup(keys::LOG_LEVEL, vars::LOG_LEVEL)
            .map(|level| LogLevel::parse_lossy(&level))
            .unwrap_or_default();

        let timeout_secs = match params.get(keys::TIMEOUT) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| ConfigError::ValidationError {
                message: format!("{} must be a whole number of seconds, got '{}'", keys::TIMEOUT, raw),
            })?),
            None => get_int::<u64>(env, vars::TIMEOUT_SECS)?,
        };
        let timeout = match timeout_secs {
            Some(0) => {
                return Err(ConfigError::ValidationError {
                    message: "timeout must be greater than 0".to_string(),
                })
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            channel,
            endpoint,
            api_token: lookup(keys::API_TOKEN, vars::API_TOKEN).map(ApiToken::new),
            external_id: lookup(keys::EXTERNAL_ID, vars::EXTERNAL_ID),
            log_level,
            timeout,
            template: EventTemplate::default(),
        })
    }
}
