#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prompt_runner::Client;

pub const MODEL: &str = "gemini-2.5-pro";

pub fn build_gemini_client(base_url: &str) -> Client {
    Client::builder()
        .api_key("test-key")
        .base_url(base_url)
        .build()
        .unwrap()
}

pub fn generate_path(model: &str) -> String {
    format!("/v1beta/models/{model}:generateContent")
}

pub fn text_response(text: &str) -> Value {
    json!({
        "candidates": [
            {
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP",
                "index": 0
            }
        ],
        "usageMetadata": {"promptTokenCount": 9, "candidatesTokenCount": 3, "totalTokenCount": 12},
        "modelVersion": MODEL
    })
}

pub async fn mount_text_reply(server: &MockServer, model: &str, text: &str) {
    Mock::given(method("POST"))
        .and(path(generate_path(model)))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response(text)))
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, model: &str, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path(generate_path(model)))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}
