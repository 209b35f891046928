//! In-memory JupiterOne GraphQL API served by wiremock
#![allow(dead_code)]

use jupiterone_client::{ClientConfig, GraphqlClient, JupiterOneClient};
use jupiterone_config::{Credentials, HttpConfig};
use jupiterone_provider::JupiterOneProvider;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

#[derive(Default)]
struct State {
    counter: u32,
    questions: HashMap<String, Value>,
    rules: HashMap<String, Value>,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.counter += 1;
        format!("{}-{}", prefix, self.counter)
    }
}

/// Stores questions and rule instances the way the API does: server IDs,
/// rule versions bumped on every update, IDs added to actions
#[derive(Clone, Default)]
pub struct FakeJupiterOne {
    state: Arc<Mutex<State>>,
}

impl FakeJupiterOne {
    pub async fn start() -> (MockServer, FakeJupiterOne) {
        let server = MockServer::start().await;
        let fake = FakeJupiterOne::default();
        Mock::given(method("POST"))
            .respond_with(fake.clone())
            .mount(&server)
            .await;
        (server, fake)
    }

    pub fn rule(&self, id: &str) -> Option<Value> {
        self.state.lock().unwrap().rules.get(id).cloned()
    }

    /// Delete a rule behind the provider's back
    pub fn remove_rule(&self, id: &str) {
        self.state.lock().unwrap().rules.remove(id);
    }

    pub fn remove_question(&self, id: &str) {
        self.state.lock().unwrap().questions.remove(id);
    }
}

impl Respond for FakeJupiterOne {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(_) => return ResponseTemplate::new(400),
        };
        let operation = body["operationName"].as_str().unwrap_or_default().to_string();
        let mut state = self.state.lock().unwrap();

        match handle(&mut state, &operation, &body["variables"]) {
            Ok(data) => ResponseTemplate::new(200).set_body_json(json!({ "data": data })),
            Err(message) => ResponseTemplate::new(200)
                .set_body_json(json!({ "data": null, "errors": [{ "message": message }] })),
        }
    }
}

fn handle(state: &mut State, operation: &str, vars: &Value) -> Result<Value, String> {
    let field = field_name(operation);
    match operation {
        "GetQuestionById" => Ok(json!({ field: state.questions.get(id(vars)).cloned() })),
        "CreateQuestion" => {
            let id = state.next_id("question");
            let mut question = vars["question"].clone();
            question["id"] = json!(id);
            state.questions.insert(id, question.clone());
            Ok(json!({ field: question }))
        }
        "UpdateQuestion" => {
            let id = id(vars).to_string();
            if !state.questions.contains_key(&id) {
                return Err("Question does not exist".to_string());
            }
            let mut question = vars["update"].clone();
            question["id"] = json!(id);
            state.questions.insert(id, question.clone());
            Ok(json!({ field: question }))
        }
        "DeleteQuestion" => match state.questions.remove(id(vars)) {
            Some(_) => Ok(json!({ field: { "id": id(vars) } })),
            None => Err("Question does not exist".to_string()),
        },
        "GetQuestionRuleInstance" => match state.rules.get(id(vars)) {
            Some(rule) => Ok(json!({ field: rule })),
            None => Err("Rule instance does not exist.".to_string()),
        },
        "CreateInlineQuestionRuleInstance" | "CreateReferencedQuestionRuleInstance" => {
            let id = state.next_id("rule");
            let instance = rule_instance(state, &vars["instance"], &id, 1);
            state.rules.insert(id, instance.clone());
            Ok(json!({ field: instance }))
        }
        "UpdateInlineQuestionRuleInstance" | "UpdateReferencedQuestionRuleInstance" => {
            let input = &vars["instance"];
            let id = input["id"].as_str().unwrap_or_default().to_string();
            let current = state
                .rules
                .get(&id)
                .map(|rule| rule["version"].as_i64().unwrap_or_default())
                .ok_or_else(|| "Rule instance does not exist.".to_string())?;
            if input["version"].as_i64() != Some(current) {
                return Err(format!(
                    "Rule instance version {} is out of date, current version is {}",
                    input["version"], current
                ));
            }
            let instance = rule_instance(state, input, &id, current + 1);
            state.rules.insert(id, instance.clone());
            Ok(json!({ field: instance }))
        }
        "DeleteRuleInstance" => match state.rules.remove(id(vars)) {
            Some(_) => Ok(json!({ field: { "id": id(vars) } })),
            None => Err("Rule instance does not exist.".to_string()),
        },
        other => Err(format!("Unknown operation {}", other)),
    }
}

fn id(vars: &Value) -> &str {
    vars["id"].as_str().unwrap_or_default()
}

fn field_name(operation: &str) -> String {
    match operation {
        "GetQuestionById" => "question".to_string(),
        "GetQuestionRuleInstance" => "questionInstance".to_string(),
        _ => {
            let mut chars = operation.chars();
            match chars.next() {
                Some(first) => first.to_lowercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

fn rule_instance(state: &mut State, input: &Value, id: &str, version: i64) -> Value {
    let mut instance = input.clone();
    instance["id"] = json!(id);
    instance["version"] = json!(version);
    for key in ["question", "questionId"] {
        if instance.get(key).is_none() {
            instance[key] = Value::Null;
        }
    }

    let operations = instance["operations"].as_array().cloned().unwrap_or_default();
    let mut rendered = Vec::new();
    for mut op in operations {
        if op.get("when").is_none() {
            op["when"] = Value::Null;
        }
        let actions = op["actions"].as_array().cloned().unwrap_or_default();
        let actions: Vec<Value> = actions
            .into_iter()
            .map(|mut action| {
                if action.get("id").is_none() {
                    action["id"] = json!(state.next_id("action"));
                }
                action
            })
            .collect();
        op["actions"] = Value::Array(actions);
        rendered.push(op);
    }
    instance["operations"] = Value::Array(rendered);
    instance
}

pub fn client_for(server: &MockServer) -> Arc<dyn GraphqlClient> {
    let credentials = Credentials {
        api_key: "test-key".to_string(),
        account_id: "j1dev".to_string(),
        region: "us".to_string(),
    };
    let config = ClientConfig::new(&credentials, &HttpConfig::default()).with_endpoint(server.uri());
    Arc::new(JupiterOneClient::new(config).unwrap())
}

pub fn provider_for(server: &MockServer) -> JupiterOneProvider {
    JupiterOneProvider::with_client("test", client_for(server))
}

/// `operationName` of every request the server received
pub async fn operations(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|request| {
            let body: Value = serde_json::from_slice(&request.body).ok()?;
            body["operationName"].as_str().map(str::to_string)
        })
        .collect()
}
