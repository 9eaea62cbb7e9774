//! Configuration types for Trailgate.
//!
//! Settings come from plugin parameters first and environment variables
//! second. Parameters may be handed over by the host or read from a YAML
//! mapping file.

pub mod env;
pub mod forwarder;
pub mod loader;
pub mod params;
pub mod secret;

pub use env::{vars, EnvError, Environment, VarSource};
pub use forwarder::{keys, ForwarderConfig, DEFAULT_TIMEOUT};
pub use loader::{load_params, ConfigError};
pub use params::PluginParams;
pub use secret::{ApiToken, Secret};
