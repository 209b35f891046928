//! GraphQL client implementation

use crate::config::ClientConfig;
use crate::errors::{ClientError, ClientResult};
use crate::graphql::{GraphqlRequest, GraphqlResponse};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

/// Header naming the account every request acts on
pub const ACCOUNT_HEADER: &str = "jupiterone-account";

/// GraphQL transport used by every operation
#[async_trait::async_trait]
pub trait GraphqlClient: Send + Sync {
    /// Execute a request and return its `data` object
    async fn execute(&self, request: GraphqlRequest) -> ClientResult<JsonValue>;
}

/// reqwest-backed client for the JupiterOne GraphQL API
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct JupiterOneClient {
    http: Client,
    endpoint: String,
}

impl JupiterOneClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        debug!(
            "Creating JupiterOne client for {} with timeout: {}s",
            config.endpoint,
            config.timeout.as_secs()
        );

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| ClientError::InvalidHeader("Authorization"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            HeaderName::from_static(ACCOUNT_HEADER),
            HeaderValue::from_str(&config.account_id)
                .map_err(|_| ClientError::InvalidHeader(ACCOUNT_HEADER))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl GraphqlClient for JupiterOneClient {
    async fn execute(&self, request: GraphqlRequest) -> ClientResult<JsonValue> {
        let operation = request.operation();
        debug!(operation, "Sending GraphQL request");

        let response = self.http.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(operation, status = status.as_u16(), "GraphQL request failed");
            // Prefer the server's own error list when it sent one
            if let Ok(envelope) = serde_json::from_str::<GraphqlResponse>(&body) {
                if !envelope.errors.is_empty() {
                    return Err(ClientError::Graphql(envelope.errors));
                }
            }
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: GraphqlResponse = serde_json::from_str(&body)?;
        let result = envelope.into_result();
        if let Err(ref e) = result {
            debug!(operation, error = %e, "GraphQL request returned errors");
        }
        result
    }
}
