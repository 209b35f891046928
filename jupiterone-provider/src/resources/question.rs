//! `jupiterone_question`: saved search queries

use super::Resource;
use crate::diagnostics::{AttributePath, Diagnostics};
use crate::error::{ProviderError, ProviderResult};
use crate::schema::{self, Decoder, Object};
use async_trait::async_trait;
use jupiterone_client::{
    create_question, delete_question, get_question, update_question, CreateQuestionInput,
    GraphqlClient, Question, QuestionQuery, QuestionUpdate,
};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const QUESTION_TYPE_NAME: &str = "jupiterone_question";

/// One query of a question, also used for inline rule questions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryModel {
    pub name: Option<String>,
    pub query: String,
    pub version: Option<String>,
}

impl QueryModel {
    /// Decode the `name`/`query`/`version` blocks found under `block`
    pub(crate) fn decode_blocks(
        decoder: &mut Decoder,
        object: &Object,
        parent: &AttributePath,
        block: &str,
    ) -> Vec<QueryModel> {
        decoder
            .blocks(object, parent, block, 1, None)
            .into_iter()
            .filter_map(|(path, block)| {
                let name = decoder.optional_string(block, &path, "name");
                let version = decoder.optional_string(block, &path, "version");
                let query = decoder.required_string(block, &path, "query")?;
                decoder.check(schema::string_length_at_least(&path.attr("query"), &query, 1));
                Some(QueryModel {
                    name,
                    query,
                    version,
                })
            })
            .collect()
    }

    pub(crate) fn encode(&self) -> JsonValue {
        json!({
            "name": self.name,
            "query": self.query,
            "version": self.version,
        })
    }

    pub(crate) fn to_wire(&self) -> QuestionQuery {
        QuestionQuery {
            name: self.name.clone(),
            query: self.query.clone(),
            version: self.version.clone(),
        }
    }
}

impl From<QuestionQuery> for QueryModel {
    fn from(query: QuestionQuery) -> Self {
        Self {
            name: query.name,
            query: query.query,
            version: query.version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionModel {
    /// Server-assigned; `None` until created
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub queries: Vec<QueryModel>,
}

impl QuestionModel {
    pub fn decode(value: &JsonValue) -> Result<Self, Diagnostics> {
        let mut decoder = Decoder::new();
        let root = AttributePath::root();
        let Some(object) = decoder.root(value) else {
            return Err(decoder.into_diagnostics());
        };

        let id = decoder.optional_string(object, &root, "id");
        let title = decoder.required_string(object, &root, "title");
        if let Some(title) = &title {
            decoder.check(schema::string_length_between(&root.attr("title"), title, 1, 255));
        }
        let description = decoder
            .optional_string(object, &root, "description")
            .unwrap_or_default();
        let tags = decoder.string_list(object, &root, "tags");
        let queries = QueryModel::decode_blocks(&mut decoder, object, &root, "query");

        let Some(title) = title else {
            return Err(decoder.into_diagnostics());
        };
        decoder.finish(QuestionModel {
            id,
            title,
            description,
            tags,
            queries,
        })
    }

    pub fn encode(&self) -> JsonValue {
        json!({
            "id": self.id,
            "title": self.title,
            "description": self.description,
            "tags": self.tags,
            "query": self.queries.iter().map(QueryModel::encode).collect::<Vec<_>>(),
        })
    }

    fn require_id(&self) -> ProviderResult<&str> {
        self.id
            .as_deref()
            .ok_or_else(|| ProviderError::InvalidState("question state has no id".to_string()))
    }

    fn wire_queries(&self) -> Vec<QuestionQuery> {
        self.queries.iter().map(QueryModel::to_wire).collect()
    }
}

impl From<Question> for QuestionModel {
    fn from(question: Question) -> Self {
        Self {
            id: Some(question.id),
            title: question.title,
            description: question.description.unwrap_or_default(),
            tags: question.tags.unwrap_or_default(),
            queries: question.queries.into_iter().map(QueryModel::from).collect(),
        }
    }
}

pub struct QuestionResource {
    client: Arc<dyn GraphqlClient>,
}

impl QuestionResource {
    pub fn new(client: Arc<dyn GraphqlClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for QuestionResource {
    type Model = QuestionModel;

    fn type_name(&self) -> &'static str {
        QUESTION_TYPE_NAME
    }

    fn decode(&self, value: &JsonValue) -> Result<QuestionModel, Diagnostics> {
        QuestionModel::decode(value)
    }

    fn encode(&self, model: &QuestionModel) -> JsonValue {
        model.encode()
    }

    async fn create(&self, plan: QuestionModel) -> ProviderResult<QuestionModel> {
        let input = CreateQuestionInput {
            title: plan.title.clone(),
            description: plan.description.clone(),
            tags: plan.tags.clone(),
            queries: plan.wire_queries(),
        };

        let question = create_question(self.client.as_ref(), &input)
            .await
            .map_err(ProviderError::api("create question"))?;
        info!(id = %question.id, title = %question.title, "Created question");
        Ok(question.into())
    }

    async fn read(&self, state: QuestionModel) -> ProviderResult<Option<QuestionModel>> {
        let id = state.require_id()?;
        debug!(id = %id, "Reading question");

        match get_question(self.client.as_ref(), id).await {
            Ok(question) => Ok(Some(question.into())),
            Err(e) if e.is_not_found() => {
                warn!(id = %id, "Question no longer exists, removing from state");
                Ok(None)
            }
            Err(e) => Err(ProviderError::api("read question")(e)),
        }
    }

    async fn update(
        &self,
        plan: QuestionModel,
        state: QuestionModel,
    ) -> ProviderResult<QuestionModel> {
        let id = state.require_id()?;
        let update = QuestionUpdate {
            title: plan.title.clone(),
            description: plan.description.clone(),
            tags: plan.tags.clone(),
            queries: plan.wire_queries(),
        };

        let question = update_question(self.client.as_ref(), id, &update)
            .await
            .map_err(ProviderError::api("update question"))?;
        info!(id = %id, "Updated question");
        Ok(question.into())
    }

    async fn delete(&self, state: QuestionModel) -> ProviderResult<()> {
        let id = state.require_id()?;

        match delete_question(self.client.as_ref(), id).await {
            Ok(()) => {
                info!(id = %id, "Deleted question");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                warn!(id = %id, "Question already deleted");
                Ok(())
            }
            Err(e) => Err(ProviderError::api("delete question")(e)),
        }
    }
}
