//! Client configuration

use jupiterone_config::{Credentials, HttpConfig};
use std::fmt;
use std::time::Duration;

/// Everything needed to build a [`crate::JupiterOneClient`]
#[derive(Clone)]
pub struct ClientConfig {
    /// GraphQL endpoint URL
    pub endpoint: String,

    /// API key sent as a bearer token
    pub api_key: String,

    /// Account the requests act on
    pub account_id: String,

    /// Request timeout
    pub timeout: Duration,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl ClientConfig {
    /// Build a configuration for the region in `credentials`
    pub fn new(credentials: &Credentials, http: &HttpConfig) -> Self {
        Self {
            endpoint: credentials.endpoint(),
            api_key: credentials.api_key.clone(),
            account_id: credentials.account_id.clone(),
            timeout: http.timeout,
            connect_timeout: http.connect_timeout,
            user_agent: http.user_agent.clone(),
        }
    }

    /// Point the client at a different endpoint, e.g. a local mock server
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("account_id", &self.account_id)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
