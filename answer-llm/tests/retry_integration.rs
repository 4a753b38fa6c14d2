use std::sync::Arc;
use std::time::Duration;

use answer_llm::{
    error::{GenerationError, LlmError},
    openai::OpenAIClient,
    retry::{RetryPolicy, RetryingCaller},
};
use mockito::Matcher;
use serde_json::json;

fn caller_for(server: &mockito::ServerGuard) -> RetryingCaller {
    let client = OpenAIClient::new("test-key")
        .unwrap()
        .with_base_url(server.url());
    RetryingCaller::new(Arc::new(client)).with_policy(RetryPolicy {
        backoff_step: Duration::from_millis(5),
        ..Default::default()
    })
}

#[tokio::test]
async fn test_output_text_is_trimmed() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/responses")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini",
            "input": "연비 좋은 소형 세단 추천",
            "max_output_tokens": 800
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"output_text": "  hello  "}).to_string())
        .expect(1)
        .create_async()
        .await;

    let answer = caller_for(&server)
        .generate("gpt-4o-mini", "연비 좋은 소형 세단 추천")
        .await
        .unwrap();

    assert_eq!(answer, "hello");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_content_blocks_are_joined() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/responses")
        .with_status(200)
        .with_body(json!({"output": [{"content": [{"text": "a"}, {"text": "b"}]}]}).to_string())
        .expect(1)
        .create_async()
        .await;

    let answer = caller_for(&server).generate("gpt-4o", "p").await.unwrap();

    assert_eq!(answer, "a\n\nb");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_output_is_empty_answer() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/responses")
        .with_status(200)
        .with_body(json!({"output": []}).to_string())
        .expect(1)
        .create_async()
        .await;

    let answer = caller_for(&server).generate("gpt-4o", "p").await.unwrap();

    assert_eq!(answer, "");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_errors_stop_after_max_retry() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/responses")
        .with_status(500)
        .with_body(json!({"error": {"message": "upstream exploded", "type": "server_error"}}).to_string())
        .expect(3)
        .create_async()
        .await;

    let err = caller_for(&server).generate("gpt-4o", "p").await.unwrap_err();

    mock.assert_async().await;
    match err {
        GenerationError::RetriesExhausted {
            attempts,
            last_error: LlmError::Api { status, message },
            ..
        } => {
            assert_eq!(attempts, 3);
            assert_eq!(status, 500);
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("Expected exhausted API error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_success_body_is_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/responses")
        .with_status(200)
        .with_body("not json at all")
        .expect(3)
        .create_async()
        .await;

    let err = caller_for(&server).generate("gpt-4o", "p").await.unwrap_err();

    mock.assert_async().await;
    assert_eq!(err.attempts(), 3);
    assert!(matches!(
        err,
        GenerationError::RetriesExhausted {
            last_error: LlmError::Parse { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_unauthorized_fails_fast_when_enabled() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/responses")
        .with_status(401)
        .with_body(json!({"error": {"message": "Incorrect API key provided"}}).to_string())
        .expect(1)
        .create_async()
        .await;

    let caller = caller_for(&server).with_policy(RetryPolicy {
        backoff_step: Duration::from_millis(5),
        fail_fast_on_client_errors: true,
        ..Default::default()
    });
    let err = caller.generate("gpt-4o", "p").await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(
        err,
        GenerationError::NonRetryable {
            source: LlmError::Authentication { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_transport_failure_is_retried() {
    // Port 1 is reserved; connections are refused.
    let client = OpenAIClient::new("test-key")
        .unwrap()
        .with_base_url("http://127.0.0.1:1");
    let caller = RetryingCaller::new(Arc::new(client)).with_policy(RetryPolicy {
        backoff_step: Duration::from_millis(1),
        ..Default::default()
    });

    let err = caller.generate("gpt-4o", "p").await.unwrap_err();
    match err {
        GenerationError::RetriesExhausted {
            attempts,
            last_error: LlmError::Network { .. },
            ..
        } => assert_eq!(attempts, 3),
        other => panic!("Expected network failure, got: {:?}", other),
    }
}
