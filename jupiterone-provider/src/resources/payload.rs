//! JSON-string attributes
//!
//! Rule triggers and actions are configured as JSON strings but travel to
//! the API as JSON values. When the API answers with a value equal to what
//! the user wrote, the user's original text is kept so state does not
//! drift on whitespace or key order.

use serde_json::Value as JsonValue;

const SERVER_ID_KEY: &str = "id";

/// Parse a validated JSON string attribute
pub fn parse(raw: &str) -> Result<JsonValue, serde_json::Error> {
    serde_json::from_str(raw)
}

/// State text for a remote payload, preferring `prior` when equivalent
pub fn render(prior: Option<&str>, remote: &JsonValue) -> String {
    let Some(prior_text) = prior else {
        return remote.to_string();
    };
    let Ok(prior_value) = parse(prior_text) else {
        return remote.to_string();
    };

    let remote = without_server_id(&prior_value, remote);
    if prior_value == remote {
        prior_text.to_string()
    } else {
        remote.to_string()
    }
}

/// Drop an `id` the server added to an object the user wrote without one
fn without_server_id(prior: &JsonValue, remote: &JsonValue) -> JsonValue {
    match (prior, remote) {
        (JsonValue::Object(prior_map), JsonValue::Object(remote_map))
            if !prior_map.contains_key(SERVER_ID_KEY) =>
        {
            let mut stripped = remote_map.clone();
            stripped.remove(SERVER_ID_KEY);
            JsonValue::Object(stripped)
        }
        _ => remote.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_equal_payload_keeps_prior_text() {
        let prior = r#"{ "type": "FILTER",  "condition": ["AND", ["queries.query0.total", ">", 0]] }"#;
        let remote = json!({ "condition": ["AND", ["queries.query0.total", ">", 0]], "type": "FILTER" });
        assert_eq!(render(Some(prior), &remote), prior);
    }

    #[test]
    fn test_server_assigned_id_is_ignored() {
        let prior = r#"{"type":"SET_PROPERTY","targetProperty":"alertLevel","targetValue":"HIGH"}"#;
        let remote = json!({
            "id": "7d2e9e1a",
            "type": "SET_PROPERTY",
            "targetProperty": "alertLevel",
            "targetValue": "HIGH"
        });
        assert_eq!(render(Some(prior), &remote), prior);
    }

    #[test]
    fn test_user_written_id_is_compared() {
        let prior = r#"{"id":"mine","type":"CREATE_ALERT"}"#;
        let remote = json!({ "id": "theirs", "type": "CREATE_ALERT" });
        let rendered = render(Some(prior), &remote);
        assert_ne!(rendered, prior);
        assert_eq!(parse(&rendered).unwrap(), remote);
    }

    #[test]
    fn test_changed_payload_renders_remote() {
        let prior = r#"{"type":"CREATE_ALERT"}"#;
        let remote = json!({ "type": "SEND_EMAIL", "id": "a-1" });
        assert_eq!(parse(&render(Some(prior), &remote)).unwrap(), json!({ "type": "SEND_EMAIL" }));
        assert_eq!(parse(&render(None, &remote)).unwrap(), remote);
    }
}
