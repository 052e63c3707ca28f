//! HTTP-level tests for the Gemini client against a mock server.

use httpmock::prelude::*;
use serde_json::json;

use docsmith::config::GeminiSettings;
use docsmith::reasoning::gemini::GeminiClient;
use docsmith::reasoning::{EmbeddingProvider, GenerativeModel};
use docsmith::types::PipelineError;

fn settings(base_url: String) -> GeminiSettings {
    GeminiSettings {
        api_key: "test-key".to_string(),
        base_url,
        generation_model: "gemini-2.5-flash".to_string(),
        embedding_model: "gemini-embedding-001".to_string(),
        embedding_dim: 3,
    }
}

#[tokio::test]
async fn generate_extracts_first_candidate_text() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.5-flash:generateContent")
                .header("x-goog-api-key", "test-key")
                .json_body_partial(r#"{"contents": [{"parts": [{"text": "split this"}]}]}"#);
            then.status(200).json_body(json!({
                "candidates": [{
                    "content": {"parts": [{"text": "```json\n[{\"title\":\"A\",\"content\":\"AAA.\"}]\n```"}]}
                }]
            }));
        })
        .await;

    let client = GeminiClient::new(&settings(server.base_url())).unwrap();
    let reply = client.generate("split this").await.unwrap();

    mock.assert_async().await;
    assert!(reply.contains("\"title\":\"A\""));
}

#[tokio::test]
async fn generate_without_candidates_is_unparseable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.5-flash:generateContent");
            then.status(200).json_body(json!({"candidates": []}));
        })
        .await;

    let client = GeminiClient::new(&settings(server.base_url())).unwrap();
    let err = client.generate("anything").await.unwrap_err();
    assert!(matches!(err, PipelineError::ServiceUnparseable(_)));
}

#[tokio::test]
async fn generate_with_undecodable_body_is_unparseable() {
    // Gemini's REST surface can return an HTML error page with status 200;
    // that must surface as unparseable output, not a transport failure.
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.5-flash:generateContent");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html><body>Something went wrong</body></html>");
        })
        .await;

    let client = GeminiClient::new(&settings(server.base_url())).unwrap();
    let err = client.generate("anything").await.unwrap_err();
    assert!(matches!(err, PipelineError::ServiceUnparseable(_)));
}

#[tokio::test]
async fn http_error_status_is_service_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.5-flash:generateContent");
            then.status(429).body("rate limited");
        })
        .await;

    let client = GeminiClient::new(&settings(server.base_url())).unwrap();
    let err = client.generate("anything").await.unwrap_err();
    match err {
        PipelineError::ServiceUnavailable(message) => {
            assert!(message.contains("429"));
            assert!(message.contains("rate limited"));
        }
        other => panic!("expected ServiceUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn embed_returns_vector_values() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-embedding-001:embedContent")
                .header("x-goog-api-key", "test-key")
                .json_body_partial(r#"{"outputDimensionality": 3}"#);
            then.status(200)
                .json_body(json!({"embedding": {"values": [0.25, -0.5, 1.0]}}));
        })
        .await;

    let client = GeminiClient::new(&settings(server.base_url())).unwrap();
    let vector = client.embed("summary\n\ntext").await.unwrap();

    mock.assert_async().await;
    assert_eq!(vector, vec![0.25, -0.5, 1.0]);
}

#[tokio::test]
async fn embed_with_mismatched_shape_is_unparseable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-embedding-001:embedContent");
            then.status(200).json_body(json!({"vectors": [0.1, 0.2]}));
        })
        .await;

    let client = GeminiClient::new(&settings(server.base_url())).unwrap();
    let err = client.embed("text").await.unwrap_err();
    assert!(matches!(err, PipelineError::ServiceUnparseable(_)));
}

#[tokio::test]
async fn embed_with_empty_values_is_unparseable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-embedding-001:embedContent");
            then.status(200).json_body(json!({"embedding": {"values": []}}));
        })
        .await;

    let client = GeminiClient::new(&settings(server.base_url())).unwrap();
    let err = client.embed("text").await.unwrap_err();
    assert!(matches!(err, PipelineError::ServiceUnparseable(_)));
}
