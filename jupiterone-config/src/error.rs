//! Configuration error types

use thiserror::Error;

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A credential could not be resolved from configuration or environment
    #[error("{attribute} must be set in the provider configuration or with the {env_var} environment variable")]
    MissingCredential {
        attribute: &'static str,
        env_var: String,
    },

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvError(String),

    /// Domain-specific configuration error
    #[error("Domain configuration error in {domain}: {message}")]
    DomainError { domain: String, message: String },
}
