//! Question queries and mutations

use crate::client::GraphqlClient;
use crate::errors::{ClientError, ClientResult};
use crate::graphql::{take_field, GraphqlRequest};
use crate::types::{CreateQuestionInput, Question, QuestionUpdate};
use serde::Deserialize;

macro_rules! question_fields {
    () => {
        "id title description tags queries { name query version }"
    };
}

const GET_QUESTION: &str = concat!(
    "query GetQuestionById($id: ID!) { question(id: $id) { ",
    question_fields!(),
    " } }"
);

const CREATE_QUESTION: &str = concat!(
    "mutation CreateQuestion($question: CreateQuestionInput!) { createQuestion(question: $question) { ",
    question_fields!(),
    " } }"
);

const UPDATE_QUESTION: &str = concat!(
    "mutation UpdateQuestion($id: ID!, $update: QuestionUpdate!) { updateQuestion(id: $id, update: $update) { ",
    question_fields!(),
    " } }"
);

const DELETE_QUESTION: &str =
    "mutation DeleteQuestion($id: ID!) { deleteQuestion(id: $id) { id } }";

#[derive(Deserialize)]
struct Deleted {
    #[allow(dead_code)]
    id: String,
}

/// Fetch a question; a `null` payload is reported as [`ClientError::NotFound`]
pub async fn get_question(client: &dyn GraphqlClient, id: &str) -> ClientResult<Question> {
    let request = GraphqlRequest::new("GetQuestionById", GET_QUESTION).variable("id", id)?;
    let data = client.execute(request).await?;
    take_field(data, "question")?.ok_or_else(|| ClientError::NotFound {
        entity: "Question",
        id: id.to_string(),
    })
}

pub async fn create_question(
    client: &dyn GraphqlClient,
    question: &CreateQuestionInput,
) -> ClientResult<Question> {
    let request =
        GraphqlRequest::new("CreateQuestion", CREATE_QUESTION).variable("question", question)?;
    let data = client.execute(request).await?;
    take_field(data, "createQuestion")?
        .ok_or_else(|| ClientError::MissingData("createQuestion".to_string()))
}

pub async fn update_question(
    client: &dyn GraphqlClient,
    id: &str,
    update: &QuestionUpdate,
) -> ClientResult<Question> {
    let request = GraphqlRequest::new("UpdateQuestion", UPDATE_QUESTION)
        .variable("id", id)?
        .variable("update", update)?;
    let data = client.execute(request).await?;
    take_field(data, "updateQuestion")?.ok_or_else(|| ClientError::NotFound {
        entity: "Question",
        id: id.to_string(),
    })
}

pub async fn delete_question(client: &dyn GraphqlClient, id: &str) -> ClientResult<()> {
    let request = GraphqlRequest::new("DeleteQuestion", DELETE_QUESTION).variable("id", id)?;
    let data = client.execute(request).await?;
    take_field::<Deleted>(data, "deleteQuestion")?;
    Ok(())
}
