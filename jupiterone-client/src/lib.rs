//! GraphQL client for the JupiterOne API
//!
//! This crate provides the transport used by the provider: a
//! [`GraphqlClient`] trait, the reqwest-backed [`JupiterOneClient`], the
//! wire types of questions and rule instances, and one function per
//! GraphQL operation.

pub mod client;
pub mod config;
pub mod errors;
pub mod graphql;
pub mod operations;
pub mod types;

// Re-export main types for convenience
pub use client::{GraphqlClient, JupiterOneClient};
pub use config::ClientConfig;
pub use errors::{ClientError, ClientResult};
pub use graphql::{GraphqlError, GraphqlRequest, GraphqlResponse};
pub use operations::question::{create_question, delete_question, get_question, update_question};
pub use operations::rule::{
    create_inline_question_rule_instance, create_referenced_question_rule_instance,
    delete_rule_instance, get_question_rule_instance, update_inline_question_rule_instance,
    update_referenced_question_rule_instance,
};
pub use types::{
    CreateInlineQuestionRuleInstanceInput, CreateQuestionInput,
    CreateReferencedQuestionRuleInstanceInput, PollingInterval, PollingIntervalError, Question,
    QuestionQuery, QuestionRuleInstance, QuestionUpdate, RuleInstanceSpec, RuleOperation,
    RuleQuestion, UpdateInlineQuestionRuleInstanceInput,
    UpdateReferencedQuestionRuleInstanceInput,
};
