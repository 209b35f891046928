//! GraphQL request/response envelope

use crate::errors::{ClientError, ClientResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A GraphQL operation ready to be posted
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub query: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<&'static str>,

    pub variables: Map<String, JsonValue>,
}

impl GraphqlRequest {
    pub fn new(operation_name: &'static str, query: &'static str) -> Self {
        Self {
            query,
            operation_name: Some(operation_name),
            variables: Map::new(),
        }
    }

    /// Add a variable, serialising it to JSON
    pub fn variable(mut self, name: &str, value: impl Serialize) -> ClientResult<Self> {
        self.variables
            .insert(name.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn operation(&self) -> &'static str {
        self.operation_name.unwrap_or("anonymous")
    }
}

/// Standard GraphQL response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<JsonValue>,

    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

impl GraphqlResponse {
    /// The `data` object, or the reported errors
    pub fn into_result(self) -> ClientResult<JsonValue> {
        if !self.errors.is_empty() {
            return Err(ClientError::Graphql(self.errors));
        }
        self.data
            .ok_or_else(|| ClientError::MissingData("data".to_string()))
    }
}

/// A single entry of the `errors` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlError {
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<JsonValue>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<JsonValue>,
}

impl GraphqlError {
    pub fn code(&self) -> Option<&str> {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .and_then(JsonValue::as_str)
    }

    pub fn is_not_found(&self) -> bool {
        if self.code() == Some("NOT_FOUND") {
            return true;
        }
        let message = self.message.to_lowercase();
        message.contains("does not exist") || message.contains("not found")
    }
}

/// Take `data[field]`, mapping `null` or a missing key to `None`
pub fn take_field<T: DeserializeOwned>(mut data: JsonValue, field: &str) -> ClientResult<Option<T>> {
    match data.get_mut(field).map(JsonValue::take) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
    }
}
