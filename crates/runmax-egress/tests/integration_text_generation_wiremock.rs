//! Integration tests for the text-generation connector and remote summary
//! strategy using wiremock
//!
//! These tests mock the inference endpoint to verify HTTP behavior and that
//! every failure mode falls back to the local description.

use runmax_core::Summarizer;
use runmax_egress::{
    EgressError, SummaryChain, TextGenerationClient, TextGenerationConfig,
};
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

fn items(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn config_for(server: &MockServer) -> TextGenerationConfig {
    TextGenerationConfig::new(format!("{}/generate", server.uri()))
}

#[tokio::test]
async fn test_generate_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(serde_json::json!({
            "parameters": { "return_full_text": false }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{ "generated_text": "['a', 'b']" }])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client =
        TextGenerationClient::new(config_for(&mock_server).with_api_key("test-key")).unwrap();

    let text = client.generate("sort ['b', 'a']").await.unwrap();
    assert_eq!(text, "['a', 'b']");
}

#[tokio::test]
async fn test_generate_single_object_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "generated_text": "sorted" })),
        )
        .mount(&mock_server)
        .await;

    let client = TextGenerationClient::new(config_for(&mock_server)).unwrap();
    assert_eq!(client.generate("prompt").await.unwrap(), "sorted");
}

#[tokio::test]
async fn test_generate_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&mock_server)
        .await;

    let client = TextGenerationClient::new(config_for(&mock_server)).unwrap();
    let err = client.generate("prompt").await.unwrap_err();

    match err {
        EgressError::ProviderError {
            status_code,
            message,
        } => {
            assert_eq!(status_code, 500);
            assert_eq!(message, "model crashed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_generate_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let client = TextGenerationClient::new(config_for(&mock_server)).unwrap();
    let err = client.generate("prompt").await.unwrap_err();
    assert!(matches!(err, EgressError::RateLimitExceeded { .. }));
}

#[tokio::test]
async fn test_generate_malformed_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let client = TextGenerationClient::new(config_for(&mock_server)).unwrap();
    let err = client.generate("prompt").await.unwrap_err();
    assert!(matches!(err, EgressError::ParseError(_)));
}

#[tokio::test]
async fn test_generate_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{ "generated_text": "late" }]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let client =
        TextGenerationClient::new(config_for(&mock_server).with_timeout_secs(1)).unwrap();
    let err = client.generate("prompt").await.unwrap_err();
    assert!(matches!(err, EgressError::Timeout(1)), "got {err:?}");
}

#[tokio::test]
async fn test_generate_retries_transient_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{ "generated_text": "second try" }])),
        )
        .mount(&mock_server)
        .await;

    let mut config = config_for(&mock_server);
    config.max_retries = 1;
    let client = TextGenerationClient::new(config).unwrap();

    assert_eq!(client.generate("prompt").await.unwrap(), "second try");
}

#[tokio::test]
async fn test_chain_uses_remote_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{ "generated_text": "g, r" }])),
        )
        .mount(&mock_server)
        .await;

    let chain = SummaryChain::from_config(&config_for(&mock_server)).unwrap();
    let text = chain.summarize(&items(&["r", "g"])).await;

    assert_eq!(text, "LLM Response: g, r");
}

#[tokio::test]
async fn test_chain_falls_back_when_remote_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let chain = SummaryChain::from_config(&config_for(&mock_server)).unwrap();
    let text = chain.summarize(&items(&["r", "g"])).await;

    assert_eq!(text, "LLM Response: Sorted alphabetically: ['g', 'r']");
}

#[tokio::test]
async fn test_chain_falls_back_when_endpoint_unreachable() {
    // Nothing listens on port 1
    let config = TextGenerationConfig::new("http://127.0.0.1:1/generate").with_timeout_secs(2);
    let chain = SummaryChain::from_config(&config).unwrap();

    let text = chain.summarize(&items(&["solo"])).await;
    assert_eq!(
        text,
        "LLM Response: Single item 'solo' is already in correct order."
    );
}
