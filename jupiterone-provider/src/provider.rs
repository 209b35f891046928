//! Provider configuration and resource registry

use crate::diagnostics::{AttributePath, Diagnostics};
use crate::error::{ProviderError, ProviderResult};
use crate::resources::{
    DynResource, JsonResource, QuestionModel, QuestionResource, RuleModel, RuleResource,
    QUESTION_TYPE_NAME, RULE_TYPE_NAME,
};
use crate::schema::Decoder;
use jupiterone_client::{ClientConfig, GraphqlClient, JupiterOneClient};
use jupiterone_config::{ConfigLoader, HttpConfig, ProviderConfig};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, info};

pub const PROVIDER_TYPE_NAME: &str = "jupiterone";

const RESOURCE_TYPES: &[&str] = &[QUESTION_TYPE_NAME, RULE_TYPE_NAME];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderMetadata {
    pub type_name: &'static str,
    pub version: String,
}

/// Builds one API client at configure time and shares it with every resource
pub struct JupiterOneProvider {
    version: String,
    http: HttpConfig,
    endpoint: Option<String>,
    client: Option<Arc<dyn GraphqlClient>>,
}

impl JupiterOneProvider {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            http: HttpConfig::default(),
            endpoint: None,
            client: None,
        }
    }

    /// A provider around an existing client; `configure` will keep it
    pub fn with_client(version: impl Into<String>, client: Arc<dyn GraphqlClient>) -> Self {
        Self {
            client: Some(client),
            ..Self::new(version)
        }
    }

    pub fn with_http_config(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Send requests here instead of the region's endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: PROVIDER_TYPE_NAME,
            version: self.version.clone(),
        }
    }

    pub fn resource_types(&self) -> &'static [&'static str] {
        RESOURCE_TYPES
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Resolve credentials and build the shared client
    ///
    /// `JUPITERONE_API_KEY`, `JUPITERONE_ACCOUNT_ID` and `JUPITERONE_REGION`
    /// take precedence over the attributes in `config`, and
    /// `JUPITERONE_HTTP_TIMEOUT` / `JUPITERONE_HTTP_USER_AGENT` over the
    /// provider's HTTP settings.
    pub fn configure(&mut self, config: &JsonValue) -> Result<(), Diagnostics> {
        let explicit = decode_provider_config(config)?;

        if self.client.is_some() {
            info!("Using already configured client");
            return Ok(());
        }

        let client = self.build_client(&explicit).map_err(Diagnostics::from)?;
        self.client = Some(client);
        info!("JupiterOne client successfully initialized");
        Ok(())
    }

    fn build_client(&self, explicit: &ProviderConfig) -> ProviderResult<Arc<dyn GraphqlClient>> {
        let loader = ConfigLoader::new();
        let credentials = loader.resolve_provider(explicit)?.credentials()?;
        let http = loader.resolve_http(&self.http)?;

        let mut config = ClientConfig::new(&credentials, &http);
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint.clone());
        }
        debug!(
            endpoint = %config.endpoint,
            account = %credentials.account_id,
            "Configuring JupiterOne client"
        );

        let client = JupiterOneClient::new(config).map_err(ProviderError::ClientSetup)?;
        Ok(Arc::new(client))
    }

    pub fn client(&self) -> ProviderResult<Arc<dyn GraphqlClient>> {
        self.client.clone().ok_or(ProviderError::NotConfigured)
    }

    /// Check a resource configuration without a configured client
    pub fn validate_resource_config(&self, type_name: &str, config: &JsonValue) -> Diagnostics {
        let result = match type_name {
            QUESTION_TYPE_NAME => QuestionModel::decode(config).map(|_| ()),
            RULE_TYPE_NAME => RuleModel::decode(config).map(|_| ()),
            other => Err(ProviderError::UnknownResourceType(other.to_string()).into()),
        };
        result.err().unwrap_or_default()
    }

    pub fn question_resource(&self) -> ProviderResult<QuestionResource> {
        Ok(QuestionResource::new(self.client()?))
    }

    pub fn rule_resource(&self) -> ProviderResult<RuleResource> {
        Ok(RuleResource::new(self.client()?))
    }

    pub fn resource(&self, type_name: &str) -> ProviderResult<Box<dyn DynResource>> {
        match type_name {
            QUESTION_TYPE_NAME => Ok(Box::new(JsonResource::new(self.question_resource()?))),
            RULE_TYPE_NAME => Ok(Box::new(JsonResource::new(self.rule_resource()?))),
            other => Err(ProviderError::UnknownResourceType(other.to_string())),
        }
    }
}

/// Provider attributes; a missing or null block means all unset
fn decode_provider_config(value: &JsonValue) -> Result<ProviderConfig, Diagnostics> {
    if value.is_null() {
        return Ok(ProviderConfig::default());
    }

    let mut decoder = Decoder::new();
    let root = AttributePath::root();
    let Some(object) = decoder.root(value) else {
        return Err(decoder.into_diagnostics());
    };

    let config = ProviderConfig {
        api_key: decoder.optional_string(object, &root, "api_key"),
        account_id: decoder.optional_string(object, &root, "account_id"),
        region: decoder.optional_string(object, &root, "region"),
    };
    decoder.finish(config)
}
