//! Client error types

use crate::graphql::GraphqlError;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Error type for JupiterOne API operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid value for header {0}")]
    InvalidHeader(&'static str),

    #[error("GraphQL request failed with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{}", join_messages(.0))]
    Graphql(Vec<GraphqlError>),

    #[error("{entity} does not exist (id={id:?})")]
    NotFound { entity: &'static str, id: String },

    #[error("Response is missing field '{0}'")]
    MissingData(String),
}

impl ClientError {
    /// Whether the API reported that the requested entity does not exist
    ///
    /// Only answers from the API itself count; transport failures and
    /// non-2xx statuses without a GraphQL error body never do.
    pub fn is_not_found(&self) -> bool {
        match self {
            ClientError::NotFound { .. } => true,
            ClientError::Graphql(errors) => errors.iter().any(GraphqlError::is_not_found),
            _ => false,
        }
    }
}

fn join_messages(errors: &[GraphqlError]) -> String {
    if errors.is_empty() {
        return "GraphQL request returned an empty error list".to_string();
    }
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn graphql_error(message: &str) -> GraphqlError {
        serde_json::from_value(json!({ "message": message })).unwrap()
    }

    #[test]
    fn test_graphql_errors_are_joined() {
        let err = ClientError::Graphql(vec![graphql_error("first"), graphql_error("second")]);
        assert_eq!(err.to_string(), "first; second");
    }

    #[test]
    fn test_not_found_classification() {
        assert!(ClientError::Graphql(vec![graphql_error("Rule instance does not exist.")]).is_not_found());
        assert!(ClientError::NotFound {
            entity: "Question",
            id: "q-1".to_string()
        }
        .is_not_found());
        assert!(!ClientError::Graphql(vec![graphql_error("Unauthorized")]).is_not_found());
        assert!(!ClientError::Status {
            status: 404,
            body: "Not Found".to_string()
        }
        .is_not_found());
    }
}
