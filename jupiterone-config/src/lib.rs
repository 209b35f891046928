//! Configuration management for the JupiterOne provider
//!
//! Configuration is split by domain (provider credentials, HTTP client,
//! logging), with validation, defaults, and `JUPITERONE_*` environment
//! variable overrides.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, ENV_PREFIX};

// Re-export domain configurations
pub use domains::{
    http::HttpConfig,
    logging::{LogFormat, LogLevel, LoggingConfig},
    provider::{Credentials, ProviderConfig, DEFAULT_REGION},
};
