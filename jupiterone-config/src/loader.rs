//! Environment variable handling

use crate::domains::http::HttpConfig;
use crate::domains::logging::{LogFormat, LogLevel, LoggingConfig};
use crate::domains::provider::ProviderConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::validation::Validatable;
use std::str::FromStr;
use std::time::Duration;

/// Prefix of every environment variable the provider reads
pub const ENV_PREFIX: &str = "JUPITERONE";

/// Merges configuration with `JUPITERONE_*` environment variables
///
/// Environment variables take precedence over the values passed in. Empty
/// variables count as unset. Every `resolve_*` validates its result.
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with the `JUPITERONE` prefix
    pub fn new() -> Self {
        Self {
            prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Merge explicitly configured provider attributes with the environment
    pub fn resolve_provider(&self, explicit: &ProviderConfig) -> ConfigResult<ProviderConfig> {
        let mut resolved = explicit.clone();
        self.apply_provider_overrides(&mut resolved);
        resolved.validate()?;
        Ok(resolved)
    }

    /// Apply `HTTP_TIMEOUT` (seconds) and `HTTP_USER_AGENT` to `base`
    pub fn resolve_http(&self, base: &HttpConfig) -> ConfigResult<HttpConfig> {
        let mut resolved = base.clone();
        self.apply_http_overrides(&mut resolved)?;
        resolved.validate()?;
        Ok(resolved)
    }

    /// Apply `LOG_LEVEL` and `LOG_FORMAT` to `base`
    pub fn resolve_logging(&self, base: &LoggingConfig) -> ConfigResult<LoggingConfig> {
        let mut resolved = base.clone();
        self.apply_logging_overrides(&mut resolved)?;
        resolved.validate()?;
        Ok(resolved)
    }

    fn apply_provider_overrides(&self, config: &mut ProviderConfig) {
        if let Some(api_key) = self.get_env_var("API_KEY") {
            config.api_key = Some(api_key);
        }

        if let Some(account_id) = self.get_env_var("ACCOUNT_ID") {
            config.account_id = Some(account_id);
        }

        if let Some(region) = self.get_env_var("REGION") {
            config.region = Some(region);
        }
    }

    fn apply_http_overrides(&self, config: &mut HttpConfig) -> ConfigResult<()> {
        if let Some(timeout) = self.get_env_var("HTTP_TIMEOUT") {
            let seconds: u64 = timeout
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid HTTP_TIMEOUT: {}", e)))?;
            config.timeout = Duration::from_secs(seconds);
            if config.connect_timeout > config.timeout {
                config.connect_timeout = config.timeout;
            }
        }

        if let Some(user_agent) = self.get_env_var("HTTP_USER_AGENT") {
            config.user_agent = user_agent;
        }

        Ok(())
    }

    fn apply_logging_overrides(&self, config: &mut LoggingConfig) -> ConfigResult<()> {
        if let Some(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Some(format) = self.get_env_var("LOG_FORMAT") {
            config.format = LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    /// Get a non-empty environment variable with prefix
    fn get_env_var(&self, name: &str) -> Option<String> {
        let key = format!("{}_{}", self.prefix, name);
        let value = std::env::var(&key).ok().filter(|v| !v.is_empty())?;
        log::debug!("Using {} from the environment", key);
        Some(value)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
