//! `jupiterone_rule`: scheduled question evaluation with alert actions
//!
//! A rule evaluates either an inline question or a saved one referenced by
//! `question_id`, never both. The API keeps a version on every rule
//! instance; updates must send the current version and the returned one is
//! written back to state.

use super::payload;
use super::question::QueryModel;
use super::Resource;
use crate::diagnostics::{AttributePath, Diagnostic, Diagnostics};
use crate::error::{ProviderError, ProviderResult};
use crate::schema::{self, Decoder, Object};
use async_trait::async_trait;
use jupiterone_client::{
    create_inline_question_rule_instance, create_referenced_question_rule_instance,
    delete_rule_instance, get_question, get_question_rule_instance,
    update_inline_question_rule_instance, update_referenced_question_rule_instance,
    CreateInlineQuestionRuleInstanceInput, CreateReferencedQuestionRuleInstanceInput,
    GraphqlClient, PollingInterval, QuestionRuleInstance, RuleInstanceSpec, RuleOperation,
    RuleQuestion as InlineQuestion, UpdateInlineQuestionRuleInstanceInput,
    UpdateReferencedQuestionRuleInstanceInput,
};
use serde_json::{json, Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const RULE_TYPE_NAME: &str = "jupiterone_rule";

const NAME_MAX_LEN: usize = 255;
const DEFAULT_SPEC_VERSION: i64 = 1;
const COMBINATION_SUMMARY: &str = "Invalid Attribute Combination";

/// Where a rule's queries come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleQuestion {
    /// Queries defined on the rule itself
    Inline(Vec<QueryModel>),
    /// ID of an existing question
    Referenced(String),
}

impl RuleQuestion {
    pub fn is_inline(&self) -> bool {
        matches!(self, RuleQuestion::Inline(_))
    }

    pub fn question_id(&self) -> Option<&str> {
        match self {
            RuleQuestion::Referenced(id) => Some(id),
            RuleQuestion::Inline(_) => None,
        }
    }
}

/// An optional trigger and the actions it fires, each kept as JSON text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationModel {
    pub when: Option<String>,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleModel {
    pub id: Option<String>,
    pub version: Option<i64>,
    pub name: String,
    pub description: String,
    pub spec_version: i64,
    pub polling_interval: PollingInterval,
    pub tags: Vec<String>,
    pub question: RuleQuestion,
    pub outputs: Vec<String>,
    pub operations: Vec<OperationModel>,
    pub notify_on_failure: bool,
    pub trigger_on_new_only: bool,
    pub templates: BTreeMap<String, String>,
}

impl RuleModel {
    pub fn decode(value: &JsonValue) -> Result<Self, Diagnostics> {
        let mut decoder = Decoder::new();
        let root = AttributePath::root();
        let Some(object) = decoder.root(value) else {
            return Err(decoder.into_diagnostics());
        };

        let id = decoder.optional_string(object, &root, "id");
        let version = decoder.optional_i64(object, &root, "version");

        let name = decoder.required_string(object, &root, "name");
        if let Some(name) = &name {
            decoder.check(schema::string_length_between(
                &root.attr("name"),
                name,
                1,
                NAME_MAX_LEN,
            ));
        }
        let description = decoder
            .optional_string(object, &root, "description")
            .unwrap_or_default();

        let spec_version = decoder
            .optional_i64(object, &root, "spec_version")
            .unwrap_or(DEFAULT_SPEC_VERSION);
        decoder.check(schema::at_least(&root.attr("spec_version"), spec_version, 1));

        let polling_interval = decode_polling_interval(&mut decoder, object, &root);
        let tags = decoder.string_list(object, &root, "tags");
        let question = decode_question(&mut decoder, object, &root);
        let outputs = decoder.string_list(object, &root, "outputs");
        let operations = decode_operations(&mut decoder, object, &root);

        let notify_on_failure = decoder
            .optional_bool(object, &root, "notify_on_failure")
            .unwrap_or(false);
        let trigger_on_new_only = decoder
            .optional_bool(object, &root, "trigger_on_new_only")
            .unwrap_or(false);
        let templates = decoder.string_map(object, &root, "templates");

        let (Some(name), Some(question)) = (name, question) else {
            return Err(decoder.into_diagnostics());
        };
        decoder.finish(RuleModel {
            id,
            version,
            name,
            description,
            spec_version,
            polling_interval,
            tags,
            question,
            outputs,
            operations,
            notify_on_failure,
            trigger_on_new_only,
            templates,
        })
    }

    pub fn encode(&self) -> JsonValue {
        let mut state = Map::new();
        state.insert("id".to_string(), json!(self.id));
        state.insert("version".to_string(), json!(self.version));
        state.insert("name".to_string(), json!(self.name));
        state.insert("description".to_string(), json!(self.description));
        state.insert("spec_version".to_string(), json!(self.spec_version));
        state.insert(
            "polling_interval".to_string(),
            json!(self.polling_interval.as_str()),
        );
        state.insert("tags".to_string(), json!(self.tags));

        match &self.question {
            RuleQuestion::Inline(queries) => {
                let queries: Vec<JsonValue> = queries.iter().map(QueryModel::encode).collect();
                state.insert("question".to_string(), json!([{ "queries": queries }]));
            }
            RuleQuestion::Referenced(question_id) => {
                state.insert("question".to_string(), json!([]));
                state.insert("question_id".to_string(), json!(question_id));
            }
        }

        state.insert("outputs".to_string(), json!(self.outputs));
        let operations: Vec<JsonValue> = self
            .operations
            .iter()
            .map(|op| json!({ "when": op.when, "actions": op.actions }))
            .collect();
        state.insert("operations".to_string(), JsonValue::Array(operations));
        state.insert(
            "notify_on_failure".to_string(),
            json!(self.notify_on_failure),
        );
        state.insert(
            "trigger_on_new_only".to_string(),
            json!(self.trigger_on_new_only),
        );
        state.insert("templates".to_string(), json!(self.templates));
        JsonValue::Object(state)
    }

    /// Attributes sent on every create and update
    pub fn instance_spec(&self) -> ProviderResult<RuleInstanceSpec> {
        let mut operations = Vec::with_capacity(self.operations.len());
        for (i, op) in self.operations.iter().enumerate() {
            let when = match &op.when {
                Some(raw) => Some(payload::parse(raw).map_err(|e| {
                    ProviderError::InvalidState(format!("operations[{}].when: {}", i, e))
                })?),
                None => None,
            };
            let actions = op
                .actions
                .iter()
                .enumerate()
                .map(|(j, raw)| {
                    payload::parse(raw).map_err(|e| {
                        ProviderError::InvalidState(format!(
                            "operations[{}].actions[{}]: {}",
                            i, j, e
                        ))
                    })
                })
                .collect::<ProviderResult<Vec<_>>>()?;
            operations.push(RuleOperation { when, actions });
        }

        Ok(RuleInstanceSpec {
            name: self.name.clone(),
            description: self.description.clone(),
            spec_version: self.spec_version,
            polling_interval: self.polling_interval,
            tags: self.tags.clone(),
            outputs: self.outputs.clone(),
            operations,
            notify_on_failure: self.notify_on_failure,
            trigger_actions_on_new_entities_only: self.trigger_on_new_only,
            templates: self.templates.clone(),
        })
    }

    /// Build state from an API answer, keeping `prior`'s JSON text for
    /// payloads the API echoed back unchanged
    pub fn from_remote(instance: QuestionRuleInstance, prior: &RuleModel) -> ProviderResult<Self> {
        let question = match (instance.question_id, instance.question) {
            (Some(question_id), _) if !question_id.is_empty() => {
                RuleQuestion::Referenced(question_id)
            }
            (_, Some(question)) => RuleQuestion::Inline(
                question.queries.into_iter().map(QueryModel::from).collect(),
            ),
            _ => {
                return Err(ProviderError::InvalidState(format!(
                    "rule {} has neither an inline question nor a question_id",
                    instance.id
                )))
            }
        };

        let operations = instance
            .operations
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, op)| {
                let prior_op = prior.operations.get(i);
                let when = op.when.as_ref().filter(|w| !w.is_null()).map(|when| {
                    payload::render(prior_op.and_then(|p| p.when.as_deref()), when)
                });
                let actions = op
                    .actions
                    .iter()
                    .enumerate()
                    .map(|(j, action)| {
                        let prior_action =
                            prior_op.and_then(|p| p.actions.get(j)).map(String::as_str);
                        payload::render(prior_action, action)
                    })
                    .collect();
                OperationModel { when, actions }
            })
            .collect();

        Ok(RuleModel {
            id: Some(instance.id),
            version: Some(instance.version),
            name: instance.name,
            description: instance.description.unwrap_or_default(),
            spec_version: instance.spec_version,
            polling_interval: instance.polling_interval,
            tags: instance.tags.unwrap_or_default(),
            question,
            outputs: instance.outputs.unwrap_or_default(),
            operations,
            notify_on_failure: instance.notify_on_failure.unwrap_or(false),
            trigger_on_new_only: instance.trigger_actions_on_new_entities_only.unwrap_or(false),
            templates: instance.templates.unwrap_or_default(),
        })
    }

    fn require_id(&self) -> ProviderResult<&str> {
        self.id
            .as_deref()
            .ok_or_else(|| ProviderError::InvalidState("rule state has no id".to_string()))
    }

    fn require_version(&self) -> ProviderResult<i64> {
        self.version
            .ok_or_else(|| ProviderError::InvalidState("rule state has no version".to_string()))
    }
}

fn decode_polling_interval(
    decoder: &mut Decoder,
    object: &Object,
    root: &AttributePath,
) -> PollingInterval {
    let Some(raw) = decoder.optional_string(object, root, "polling_interval") else {
        return PollingInterval::default();
    };

    let choices: Vec<&str> = PollingInterval::all().iter().map(|p| p.as_str()).collect();
    match raw.parse() {
        Ok(interval) => interval,
        Err(_) => {
            decoder.check(schema::one_of(&root.attr("polling_interval"), &raw, &choices));
            PollingInterval::default()
        }
    }
}

fn decode_question(
    decoder: &mut Decoder,
    object: &Object,
    root: &AttributePath,
) -> Option<RuleQuestion> {
    let blocks = decoder.blocks(object, root, "question", 0, Some(1));
    let question_id = decoder.optional_string(object, root, "question_id");

    match (blocks.first(), question_id) {
        (Some(_), Some(_)) => {
            decoder.push(
                Diagnostic::error(
                    COMBINATION_SUMMARY,
                    "Attribute \"question_id\" cannot be specified when \"question\" is specified",
                )
                .at(&root.attr("question_id")),
            );
            None
        }
        (None, Some(question_id)) => {
            decoder.check(schema::string_length_at_least(
                &root.attr("question_id"),
                &question_id,
                1,
            ));
            Some(RuleQuestion::Referenced(question_id))
        }
        (Some((path, block)), None) => {
            let queries = QueryModel::decode_blocks(decoder, block, path, "queries");
            Some(RuleQuestion::Inline(queries))
        }
        (None, None)
            if unset_or_list(object, "question") && !schema::is_set(object, "question_id") =>
        {
            decoder.push(Diagnostic::error(
                COMBINATION_SUMMARY,
                "No attribute specified when one (and only one) of [question,question_id] is required",
            ));
            None
        }
        // a mistyped attribute, already reported
        (None, None) => None,
    }
}

fn unset_or_list(object: &Object, name: &str) -> bool {
    object
        .get(name)
        .map_or(true, |value| value.is_null() || value.is_array())
}

fn decode_operations(
    decoder: &mut Decoder,
    object: &Object,
    root: &AttributePath,
) -> Vec<OperationModel> {
    decoder
        .object_list(object, root, "operations")
        .into_iter()
        .map(|(path, block)| {
            let when = decoder.optional_string(block, &path, "when");
            if let Some(when) = &when {
                decoder.check(schema::valid_json(&path.attr("when"), when));
            }

            let actions = decoder.string_list(block, &path, "actions");
            let actions_path = path.attr("actions");
            for (j, action) in actions.iter().enumerate() {
                decoder.check(schema::valid_json(&actions_path.index(j), action));
            }
            OperationModel { when, actions }
        })
        .collect()
}

fn inline_question(queries: &[QueryModel]) -> InlineQuestion {
    InlineQuestion {
        queries: queries.iter().map(QueryModel::to_wire).collect(),
    }
}

pub struct RuleResource {
    client: Arc<dyn GraphqlClient>,
}

impl RuleResource {
    pub fn new(client: Arc<dyn GraphqlClient>) -> Self {
        Self { client }
    }

    /// Fail before any mutation when `question_id` names no question
    async fn ensure_question_exists(&self, question_id: &str) -> ProviderResult<()> {
        match get_question(self.client.as_ref(), question_id).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Err(ProviderError::ReferencedQuestionNotFound(
                question_id.to_string(),
            )),
            Err(e) => Err(ProviderError::api("look up referenced question")(e)),
        }
    }
}

#[async_trait]
impl Resource for RuleResource {
    type Model = RuleModel;

    fn type_name(&self) -> &'static str {
        RULE_TYPE_NAME
    }

    fn decode(&self, value: &JsonValue) -> Result<RuleModel, Diagnostics> {
        RuleModel::decode(value)
    }

    fn encode(&self, model: &RuleModel) -> JsonValue {
        model.encode()
    }

    async fn create(&self, plan: RuleModel) -> ProviderResult<RuleModel> {
        let spec = plan.instance_spec()?;
        let client = self.client.as_ref();

        let instance = match &plan.question {
            RuleQuestion::Inline(queries) => {
                let input = CreateInlineQuestionRuleInstanceInput {
                    spec,
                    question: inline_question(queries),
                };
                create_inline_question_rule_instance(client, &input).await
            }
            RuleQuestion::Referenced(question_id) => {
                self.ensure_question_exists(question_id).await?;
                let input = CreateReferencedQuestionRuleInstanceInput {
                    spec,
                    question_id: question_id.clone(),
                };
                create_referenced_question_rule_instance(client, &input).await
            }
        }
        .map_err(ProviderError::api("create rule"))?;

        info!(
            id = %instance.id,
            version = instance.version,
            inline = plan.question.is_inline(),
            "Created rule"
        );
        RuleModel::from_remote(instance, &plan)
    }

    async fn read(&self, state: RuleModel) -> ProviderResult<Option<RuleModel>> {
        let id = state.require_id()?;
        debug!(id = %id, "Reading rule");

        match get_question_rule_instance(self.client.as_ref(), id).await {
            Ok(instance) => RuleModel::from_remote(instance, &state).map(Some),
            Err(e) if e.is_not_found() => {
                warn!(id = %id, "Rule no longer exists, removing from state");
                Ok(None)
            }
            Err(e) => Err(ProviderError::api("read rule")(e)),
        }
    }

    async fn update(&self, plan: RuleModel, state: RuleModel) -> ProviderResult<RuleModel> {
        let id = state.require_id()?.to_string();
        let version = state.require_version()?;
        let spec = plan.instance_spec()?;
        let client = self.client.as_ref();

        let instance = match &plan.question {
            RuleQuestion::Inline(queries) => {
                let input = UpdateInlineQuestionRuleInstanceInput {
                    id: id.clone(),
                    version,
                    spec,
                    question: inline_question(queries),
                };
                update_inline_question_rule_instance(client, &input).await
            }
            RuleQuestion::Referenced(question_id) => {
                self.ensure_question_exists(question_id).await?;
                let input = UpdateReferencedQuestionRuleInstanceInput {
                    id: id.clone(),
                    version,
                    spec,
                    question_id: question_id.clone(),
                };
                update_referenced_question_rule_instance(client, &input).await
            }
        }
        .map_err(ProviderError::api("update rule"))?;

        if instance.version != version + 1 {
            debug!(
                id = %id,
                sent = version,
                received = instance.version,
                "Rule version moved by more than one"
            );
        }
        info!(id = %id, version = instance.version, "Updated rule");
        RuleModel::from_remote(instance, &plan)
    }

    async fn delete(&self, state: RuleModel) -> ProviderResult<()> {
        let id = state.require_id()?;

        match delete_rule_instance(self.client.as_ref(), id).await {
            Ok(()) => {
                info!(id = %id, "Deleted rule");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                warn!(id = %id, "Rule already deleted");
                Ok(())
            }
            Err(e) => Err(ProviderError::api("delete rule")(e)),
        }
    }
}
