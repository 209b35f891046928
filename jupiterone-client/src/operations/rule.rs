//! Rule-instance queries and mutations

use crate::client::GraphqlClient;
use crate::errors::{ClientError, ClientResult};
use crate::graphql::{take_field, GraphqlRequest};
use crate::types::{
    CreateInlineQuestionRuleInstanceInput, CreateReferencedQuestionRuleInstanceInput,
    QuestionRuleInstance, UpdateInlineQuestionRuleInstanceInput,
    UpdateReferencedQuestionRuleInstanceInput,
};
use serde::Deserialize;

macro_rules! rule_instance_fields {
    () => {
        "id version name description specVersion pollingInterval tags questionId \
         question { queries { name query version } } outputs operations { when actions } \
         notifyOnFailure triggerActionsOnNewEntitiesOnly templates"
    };
}

const GET_RULE_INSTANCE: &str = concat!(
    "query GetQuestionRuleInstance($id: ID!) { questionInstance(id: $id) { ",
    rule_instance_fields!(),
    " } }"
);

const CREATE_INLINE_RULE_INSTANCE: &str = concat!(
    "mutation CreateInlineQuestionRuleInstance($instance: CreateInlineQuestionRuleInstanceInput!) { ",
    "createInlineQuestionRuleInstance(instance: $instance) { ",
    rule_instance_fields!(),
    " } }"
);

const CREATE_REFERENCED_RULE_INSTANCE: &str = concat!(
    "mutation CreateReferencedQuestionRuleInstance($instance: CreateReferencedQuestionRuleInstanceInput!) { ",
    "createReferencedQuestionRuleInstance(instance: $instance) { ",
    rule_instance_fields!(),
    " } }"
);

const UPDATE_INLINE_RULE_INSTANCE: &str = concat!(
    "mutation UpdateInlineQuestionRuleInstance($instance: UpdateInlineQuestionRuleInstanceInput!) { ",
    "updateInlineQuestionRuleInstance(instance: $instance) { ",
    rule_instance_fields!(),
    " } }"
);

const UPDATE_REFERENCED_RULE_INSTANCE: &str = concat!(
    "mutation UpdateReferencedQuestionRuleInstance($instance: UpdateReferencedQuestionRuleInstanceInput!) { ",
    "updateReferencedQuestionRuleInstance(instance: $instance) { ",
    rule_instance_fields!(),
    " } }"
);

const DELETE_RULE_INSTANCE: &str =
    "mutation DeleteRuleInstance($id: ID!) { deleteRuleInstance(id: $id) { id } }";

#[derive(Deserialize)]
struct Deleted {
    #[allow(dead_code)]
    id: String,
}

/// Fetch a rule instance; a `null` payload is reported as [`ClientError::NotFound`]
pub async fn get_question_rule_instance(
    client: &dyn GraphqlClient,
    id: &str,
) -> ClientResult<QuestionRuleInstance> {
    let request =
        GraphqlRequest::new("GetQuestionRuleInstance", GET_RULE_INSTANCE).variable("id", id)?;
    let data = client.execute(request).await?;
    take_field(data, "questionInstance")?.ok_or_else(|| ClientError::NotFound {
        entity: "Rule instance",
        id: id.to_string(),
    })
}

pub async fn create_inline_question_rule_instance(
    client: &dyn GraphqlClient,
    instance: &CreateInlineQuestionRuleInstanceInput,
) -> ClientResult<QuestionRuleInstance> {
    mutate(
        client,
        "CreateInlineQuestionRuleInstance",
        CREATE_INLINE_RULE_INSTANCE,
        "createInlineQuestionRuleInstance",
        instance,
    )
    .await
}

pub async fn create_referenced_question_rule_instance(
    client: &dyn GraphqlClient,
    instance: &CreateReferencedQuestionRuleInstanceInput,
) -> ClientResult<QuestionRuleInstance> {
    mutate(
        client,
        "CreateReferencedQuestionRuleInstance",
        CREATE_REFERENCED_RULE_INSTANCE,
        "createReferencedQuestionRuleInstance",
        instance,
    )
    .await
}

pub async fn update_inline_question_rule_instance(
    client: &dyn GraphqlClient,
    instance: &UpdateInlineQuestionRuleInstanceInput,
) -> ClientResult<QuestionRuleInstance> {
    mutate(
        client,
        "UpdateInlineQuestionRuleInstance",
        UPDATE_INLINE_RULE_INSTANCE,
        "updateInlineQuestionRuleInstance",
        instance,
    )
    .await
}

pub async fn update_referenced_question_rule_instance(
    client: &dyn GraphqlClient,
    instance: &UpdateReferencedQuestionRuleInstanceInput,
) -> ClientResult<QuestionRuleInstance> {
    mutate(
        client,
        "UpdateReferencedQuestionRuleInstance",
        UPDATE_REFERENCED_RULE_INSTANCE,
        "updateReferencedQuestionRuleInstance",
        instance,
    )
    .await
}

pub async fn delete_rule_instance(client: &dyn GraphqlClient, id: &str) -> ClientResult<()> {
    let request =
        GraphqlRequest::new("DeleteRuleInstance", DELETE_RULE_INSTANCE).variable("id", id)?;
    let data = client.execute(request).await?;
    take_field::<Deleted>(data, "deleteRuleInstance")?;
    Ok(())
}

async fn mutate<I: serde::Serialize + Sync>(
    client: &dyn GraphqlClient,
    operation: &'static str,
    query: &'static str,
    field: &str,
    instance: &I,
) -> ClientResult<QuestionRuleInstance> {
    let request = GraphqlRequest::new(operation, query).variable("instance", instance)?;
    let data = client.execute(request).await?;
    take_field(data, field)?.ok_or_else(|| ClientError::MissingData(field.to_string()))
}
