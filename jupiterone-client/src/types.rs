//! Wire types of the question and rule-instance APIs

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A named query inside a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub query: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A saved question as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub tags: Option<Vec<String>>,

    #[serde(default)]
    pub queries: Vec<QuestionQuery>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionInput {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub queries: Vec<QuestionQuery>,
}

/// Full replacement of a question's mutable attributes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionUpdate {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub queries: Vec<QuestionQuery>,
}

/// How often a rule's queries are evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum PollingInterval {
    Disabled,
    ThirtyMinutes,
    OneHour,
    FourHours,
    EightHours,
    TwelveHours,
    #[default]
    OneDay,
    OneWeek,
}

impl PollingInterval {
    /// Get the API representation of the interval
    pub fn as_str(&self) -> &'static str {
        match self {
            PollingInterval::Disabled => "DISABLED",
            PollingInterval::ThirtyMinutes => "THIRTY_MINUTES",
            PollingInterval::OneHour => "ONE_HOUR",
            PollingInterval::FourHours => "FOUR_HOURS",
            PollingInterval::EightHours => "EIGHT_HOURS",
            PollingInterval::TwelveHours => "TWELVE_HOURS",
            PollingInterval::OneDay => "ONE_DAY",
            PollingInterval::OneWeek => "ONE_WEEK",
        }
    }

    /// Get all supported intervals
    pub fn all() -> &'static [PollingInterval] {
        &[
            PollingInterval::Disabled,
            PollingInterval::ThirtyMinutes,
            PollingInterval::OneHour,
            PollingInterval::FourHours,
            PollingInterval::EightHours,
            PollingInterval::TwelveHours,
            PollingInterval::OneDay,
            PollingInterval::OneWeek,
        ]
    }
}

impl fmt::Display for PollingInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PollingInterval {
    type Err = PollingIntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PollingInterval::all()
            .iter()
            .copied()
            .find(|interval| interval.as_str() == s)
            .ok_or_else(|| PollingIntervalError::InvalidInterval(s.to_string()))
    }
}

/// Errors that can occur when parsing polling intervals
#[derive(Error, Debug, Clone)]
pub enum PollingIntervalError {
    #[error("Invalid polling interval: '{0}'")]
    InvalidInterval(String),
}

/// One conditional block of a rule: an optional trigger and its actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOperation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<JsonValue>,

    #[serde(default)]
    pub actions: Vec<JsonValue>,
}

/// Question embedded in a rule instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleQuestion {
    pub queries: Vec<QuestionQuery>,
}

/// A rule instance as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRuleInstance {
    pub id: String,
    pub version: i64,
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "default_spec_version")]
    pub spec_version: i64,

    #[serde(default)]
    pub polling_interval: PollingInterval,

    #[serde(default)]
    pub tags: Option<Vec<String>>,

    #[serde(default)]
    pub question_id: Option<String>,

    #[serde(default)]
    pub question: Option<RuleQuestion>,

    #[serde(default)]
    pub outputs: Option<Vec<String>>,

    #[serde(default)]
    pub operations: Option<Vec<RuleOperation>>,

    #[serde(default)]
    pub notify_on_failure: Option<bool>,

    #[serde(default)]
    pub trigger_actions_on_new_entities_only: Option<bool>,

    #[serde(default)]
    pub templates: Option<BTreeMap<String, String>>,
}

fn default_spec_version() -> i64 {
    1
}

/// Attributes shared by every rule-instance create and update input
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleInstanceSpec {
    pub name: String,
    pub description: String,
    pub spec_version: i64,
    pub polling_interval: PollingInterval,
    pub tags: Vec<String>,
    pub outputs: Vec<String>,
    pub operations: Vec<RuleOperation>,
    pub notify_on_failure: bool,
    pub trigger_actions_on_new_entities_only: bool,
    pub templates: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInlineQuestionRuleInstanceInput {
    #[serde(flatten)]
    pub spec: RuleInstanceSpec,
    pub question: RuleQuestion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReferencedQuestionRuleInstanceInput {
    #[serde(flatten)]
    pub spec: RuleInstanceSpec,
    pub question_id: String,
}

/// `version` must be the instance's current version; the API answers with
/// the incremented one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInlineQuestionRuleInstanceInput {
    pub id: String,
    pub version: i64,
    #[serde(flatten)]
    pub spec: RuleInstanceSpec,
    pub question: RuleQuestion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReferencedQuestionRuleInstanceInput {
    pub id: String,
    pub version: i64,
    #[serde(flatten)]
    pub spec: RuleInstanceSpec,
    pub question_id: String,
}
