//! JupiterOne provider
//!
//! Manages `jupiterone_question` and `jupiterone_rule` resources against the
//! JupiterOne GraphQL API. [`JupiterOneProvider`] resolves credentials and
//! builds the shared client; each resource decodes its configuration into
//! a typed model, reporting problems as [`Diagnostics`] before any request
//! is sent.

pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod provider;
pub mod resources;
pub mod schema;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export main types for convenience
pub use diagnostics::{AttributePath, Diagnostic, Diagnostics, Severity};
pub use error::{ProviderError, ProviderResult, CONFIGURE_ERROR_SUMMARY};
pub use logging::{init_logging_from_config, init_logging_from_env, init_simple_tracing};
pub use provider::{JupiterOneProvider, ProviderMetadata, PROVIDER_TYPE_NAME};
pub use resources::{
    DynResource, JsonResource, OperationModel, QueryModel, QuestionModel, QuestionResource,
    Resource, RuleModel, RuleQuestion, RuleResource, QUESTION_TYPE_NAME, RULE_TYPE_NAME,
};
