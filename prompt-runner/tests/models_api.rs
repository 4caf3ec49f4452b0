mod support;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prompt_runner::types::config::GenerationConfig;
use prompt_runner::types::content::Content;
use prompt_runner::types::enums::FinishReason;
use prompt_runner::types::models::GenerateContentConfig;
use prompt_runner::Error;

use support::{build_gemini_client, generate_path, mount_status, mount_text_reply, MODEL};

#[tokio::test]
async fn test_generate_content_gemini_api() {
    let server = MockServer::start().await;
    mount_text_reply(&server, MODEL, "Hello").await;

    let client = build_gemini_client(&server.uri());
    let response = client
        .models()
        .generate_content(MODEL, vec![Content::user("Test")])
        .await
        .unwrap();

    assert_eq!(response.text(), Some("Hello".to_string()));
    assert_eq!(response.finish_reason(), Some(FinishReason::Stop));
    assert_eq!(response.model_version.as_deref(), Some(MODEL));
}

#[tokio::test]
async fn test_generate_content_accepts_prefixed_model_name() {
    let server = MockServer::start().await;
    mount_text_reply(&server, MODEL, "Hello").await;

    let client = build_gemini_client(&server.uri());
    let response = client
        .models()
        .generate_content(format!("models/{MODEL}"), vec![Content::user("Test")])
        .await
        .unwrap();
    assert_eq!(response.text().as_deref(), Some("Hello"));
}

#[tokio::test]
async fn test_generate_content_with_system_instruction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path(MODEL)))
        .and(body_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "Test"}]}],
            "systemInstruction": {"role": "user", "parts": [{"text": "Answer in one word"}]},
            "generationConfig": {"maxOutputTokens": 8}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(support::text_response("Ok")))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_gemini_client(&server.uri());
    let config = GenerateContentConfig {
        system_instruction: Some(Content::user("Answer in one word")),
        generation_config: Some(GenerationConfig {
            max_output_tokens: Some(8),
            ..Default::default()
        }),
    };
    let response = client
        .models()
        .generate_content_with_config(MODEL, vec![Content::user("Test")], config)
        .await
        .unwrap();
    assert_eq!(response.text().as_deref(), Some("Ok"));
}

#[tokio::test]
async fn test_invalid_api_key_surfaces_at_call_time() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        MODEL,
        400,
        json!({"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}}),
    )
    .await;

    let client = build_gemini_client(&server.uri());
    let model = client.model(MODEL);
    let err = model.generate("hello").await.unwrap_err();
    match err {
        Error::ApiError { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("API key not valid"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_quota_exhaustion_is_rate_limited() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        MODEL,
        429,
        json!({"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}),
    )
    .await;

    let client = build_gemini_client(&server.uri());
    let err = client.model(MODEL).generate("hello").await.unwrap_err();
    assert!(err.is_rate_limited());
}

#[tokio::test]
async fn test_model_handle_creation_performs_no_io() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let client = build_gemini_client(&server.uri());
    let model = client.model("gemini-2.0-flash");
    assert_eq!(model.name(), "gemini-2.0-flash");
}
