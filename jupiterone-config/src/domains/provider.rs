//! Provider credentials and region configuration

use crate::error::{ConfigError, ConfigResult};
use crate::loader::ENV_PREFIX;
use crate::validation::{validate_region, Validatable};
use std::fmt;

/// Region used when none is configured
pub const DEFAULT_REGION: &str = "us";

/// The three provider attributes, each optional until resolved
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    /// API key used to make requests to the JupiterOne APIs
    pub api_key: Option<String>,

    /// JupiterOne account ID to create resources in
    pub account_id: Option<String>,

    /// Region of the JupiterOne deployment, `us` when unset
    pub region: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("account_id", &self.account_id)
            .field("region", &self.region)
            .finish()
    }
}

impl ProviderConfig {
    /// Effective region, lowercased
    pub fn region(&self) -> String {
        self.region
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REGION)
            .to_ascii_lowercase()
    }

    /// GraphQL endpoint for the effective region
    pub fn endpoint(&self) -> String {
        format!("https://graphql.{}.jupiterone.io", self.region())
    }

    /// Resolve the credentials required to build a client
    pub fn credentials(&self) -> ConfigResult<Credentials> {
        let api_key = required(&self.api_key, "api_key", "API_KEY")?;
        let account_id = required(&self.account_id, "account_id", "ACCOUNT_ID")?;

        Ok(Credentials {
            api_key,
            account_id,
            region: self.region(),
        })
    }
}

fn required(value: &Option<String>, attribute: &'static str, env_name: &str) -> ConfigResult<String> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ConfigError::MissingCredential {
            attribute,
            env_var: format!("{}_{}", ENV_PREFIX, env_name),
        }),
    }
}

impl Validatable for ProviderConfig {
    fn validate(&self) -> ConfigResult<()> {
        // Unresolved credentials are reported by `credentials()`, only the
        // region has a format constraint.
        if self.region.as_deref().is_some_and(|r| !r.is_empty()) {
            validate_region(&self.region(), "region", self.domain_name())?;
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "provider"
    }
}

/// Fully resolved credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub account_id: String,
    pub region: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("account_id", &self.account_id)
            .field("region", &self.region)
            .finish()
    }
}

impl Credentials {
    /// GraphQL endpoint for these credentials' region
    pub fn endpoint(&self) -> String {
        format!("https://graphql.{}.jupiterone.io", self.region)
    }
}
