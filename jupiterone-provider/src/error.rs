//! Provider error types

use crate::diagnostics::{Diagnostic, Diagnostics};
use jupiterone_client::ClientError;
use jupiterone_config::ConfigError;
use thiserror::Error;

/// Summary shared by every configure-time failure
pub const CONFIGURE_ERROR_SUMMARY: &str =
    "failed to create JupiterOne client in provider configuration";

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Configuration or state failed validation
    #[error("{0}")]
    Invalid(Diagnostics),

    #[error("failed to create JupiterOne client in provider configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to create JupiterOne client in provider configuration: {0}")]
    ClientSetup(ClientError),

    #[error("provider has not been configured")]
    NotConfigured,

    #[error("unknown resource type {0:?}")]
    UnknownResourceType(String),

    /// A remote call failed; the API's message is kept as-is
    #[error("failed to {action}: {source}")]
    Api {
        action: &'static str,
        #[source]
        source: ClientError,
    },

    #[error("question_id {0:?} does not refer to an existing question")]
    ReferencedQuestionNotFound(String),

    /// Stored state is missing something an operation needs
    #[error("invalid resource state: {0}")]
    InvalidState(String),
}

impl ProviderError {
    /// Wrap a client error with the action that triggered it
    pub fn api(action: &'static str) -> impl FnOnce(ClientError) -> ProviderError {
        move |source| ProviderError::Api { action, source }
    }

    /// Whether this wraps an API answer that the entity does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::Api { source, .. } if source.is_not_found())
    }
}

impl From<Diagnostics> for ProviderError {
    fn from(diagnostics: Diagnostics) -> Self {
        ProviderError::Invalid(diagnostics)
    }
}

impl From<ProviderError> for Diagnostics {
    fn from(error: ProviderError) -> Self {
        let diagnostic = match error {
            ProviderError::Invalid(diagnostics) => return diagnostics,
            ProviderError::Config(e) => Diagnostic::error(CONFIGURE_ERROR_SUMMARY, e.to_string()),
            ProviderError::ClientSetup(e) => {
                Diagnostic::error(CONFIGURE_ERROR_SUMMARY, e.to_string())
            }
            ProviderError::NotConfigured => Diagnostic::error(
                "Unconfigured provider",
                "The provider must be configured before resources are used.",
            ),
            ProviderError::UnknownResourceType(name) => Diagnostic::error(
                "Unsupported resource type",
                format!("The provider does not support resource type {:?}.", name),
            ),
            ProviderError::Api { action, source } => {
                Diagnostic::error(format!("Failed to {}", action), source.to_string())
            }
            e @ ProviderError::ReferencedQuestionNotFound(_) => {
                Diagnostic::error("Referenced question not found", e.to_string())
            }
            ProviderError::InvalidState(detail) => {
                Diagnostic::error("Invalid resource state", detail)
            }
        };
        diagnostic.into()
    }
}
