//! Eventual-consistency helpers for acceptance tests
//!
//! The API may briefly report a freshly created object as missing, or a
//! deleted one as present. These helpers poll until the expected state is
//! visible or [`CONSISTENCY_TIMEOUT`] has passed. Only that one condition
//! is retried; any other API error ends the wait at once.

use jupiterone_client::{
    get_question, get_question_rule_instance, ClientError, ClientResult, GraphqlClient, Question,
    QuestionRuleInstance,
};
use jupiterone_resilience::{RetryError, RetryExecutor, RetryPolicy, Retryable};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

pub const CONSISTENCY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ConsistencyError {
    /// The expected state is not visible yet
    #[error("{0}")]
    Pending(String),

    #[error(transparent)]
    Api(#[from] ClientError),
}

impl Retryable for ConsistencyError {
    fn is_retryable(&self) -> bool {
        matches!(self, ConsistencyError::Pending(_))
    }
}

pub type ConsistencyResult<T> = Result<T, RetryError<ConsistencyError>>;

fn executor(timeout: Duration) -> RetryExecutor {
    RetryExecutor::new(RetryPolicy::until(timeout))
}

async fn await_exists<T, F, Fut>(timeout: Duration, mut fetch: F) -> ConsistencyResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    executor(timeout)
        .execute(|| {
            let attempt = fetch();
            async move {
                match attempt.await {
                    Ok(found) => Ok(found),
                    Err(e) if e.is_not_found() => Err(ConsistencyError::Pending(e.to_string())),
                    Err(e) => Err(ConsistencyError::Api(e)),
                }
            }
        })
        .await
}

async fn await_absent<T, F, Fut>(
    timeout: Duration,
    describe: &str,
    mut fetch: F,
) -> ConsistencyResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    executor(timeout)
        .execute(|| {
            let attempt = fetch();
            async move {
                match attempt.await {
                    Ok(_) => Err(ConsistencyError::Pending(format!("{} still exists", describe))),
                    Err(e) if e.is_not_found() => Ok(()),
                    Err(e) => Err(ConsistencyError::Api(e)),
                }
            }
        })
        .await
}

/// Wait until a created rule instance can be read back
pub async fn wait_for_rule(
    client: &dyn GraphqlClient,
    id: &str,
) -> ConsistencyResult<QuestionRuleInstance> {
    await_exists(CONSISTENCY_TIMEOUT, || get_question_rule_instance(client, id)).await
}

/// Wait until a deleted rule instance is reported missing
pub async fn wait_for_rule_destroyed(client: &dyn GraphqlClient, id: &str) -> ConsistencyResult<()> {
    let describe = format!("Rule instance (id={:?})", id);
    await_absent(CONSISTENCY_TIMEOUT, &describe, || {
        get_question_rule_instance(client, id)
    })
    .await
}

pub async fn wait_for_question(client: &dyn GraphqlClient, id: &str) -> ConsistencyResult<Question> {
    await_exists(CONSISTENCY_TIMEOUT, || get_question(client, id)).await
}

pub async fn wait_for_question_destroyed(
    client: &dyn GraphqlClient,
    id: &str,
) -> ConsistencyResult<()> {
    let describe = format!("Question (id={:?})", id);
    await_absent(CONSISTENCY_TIMEOUT, &describe, || get_question(client, id)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use jupiterone_client::GraphqlError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn graphql_error(message: &str) -> ClientError {
        ClientError::Graphql(vec![GraphqlError {
            message: message.to_string(),
            path: None,
            extensions: None,
        }])
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_exists_retries_not_found() {
        let calls = AtomicU32::new(0);

        let found = await_exists(CONSISTENCY_TIMEOUT, || {
            let call = calls.fetch_add(1, Ordering::Relaxed);
            async move {
                if call < 2 {
                    Err(graphql_error("Rule instance does not exist."))
                } else {
                    Ok(call)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(found, 2);
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_exists_stops_on_other_errors() {
        let calls = AtomicU32::new(0);

        let err = await_exists(CONSISTENCY_TIMEOUT, || {
            calls.fetch_add(1, Ordering::Relaxed);
            async { Err::<(), _>(graphql_error("Unauthorized")) }
        })
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            RetryError::NonRetryableError(ConsistencyError::Api(_))
        ));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_absent_times_out_while_present() {
        let err = await_absent(CONSISTENCY_TIMEOUT, "Rule instance", || async {
            Ok::<_, ClientError>(())
        })
        .await
        .unwrap_err();

        match err {
            RetryError::TimedOut {
                timeout,
                last_error,
                ..
            } => {
                assert_eq!(timeout, CONSISTENCY_TIMEOUT);
                assert_eq!(last_error.to_string(), "Rule instance still exists");
            }
            other => panic!("expected timeout, got {}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_absent_accepts_null_payload() {
        let result = await_absent(CONSISTENCY_TIMEOUT, "Question", || async {
            Err::<(), _>(ClientError::NotFound {
                entity: "Question",
                id: "question-1".to_string(),
            })
        })
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_wait_for_rule_destroyed_against_api() {
        use jupiterone_client::{ClientConfig, JupiterOneClient};
        use jupiterone_config::{Credentials, HttpConfig};
        use serde_json::json;
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{ "message": "Rule instance does not exist." }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let credentials = Credentials {
            api_key: "test-key".to_string(),
            account_id: "j1dev".to_string(),
            region: "us".to_string(),
        };
        let config =
            ClientConfig::new(&credentials, &HttpConfig::default()).with_endpoint(server.uri());
        let client = JupiterOneClient::new(config).unwrap();

        wait_for_rule_destroyed(&client, "rule-1").await.unwrap();
    }
}
