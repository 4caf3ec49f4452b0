//! End-to-end flow against a mock endpoint, plus an opt-in live check.

use std::collections::HashMap;

use wiremock::MockServer;

use prompt_runner::{PromptRunner, RunnerConfig};

mod support;
use support::{mount_text_reply, MODEL};

#[tokio::test]
async fn api_smoke_configure_model_generate_print() {
    let server = MockServer::start().await;
    mount_text_reply(&server, MODEL, "ok").await;

    let vars: HashMap<&str, String> = HashMap::from([
        ("GEMINI_API_KEY", "test-key".to_string()),
        ("GENAI_BASE_URL", server.uri()),
    ]);
    let config = RunnerConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();
    let runner = PromptRunner::new(&config).unwrap();

    let mut out = Vec::new();
    let text = runner.run(&mut out).await.unwrap();
    assert_eq!(text, "ok");
    assert_eq!(out, b"ok\n");
}

/// Hits the real Gemini API. Run with `GEMINI_API_KEY` set and `--ignored`.
#[tokio::test]
#[ignore = "requires network access and GEMINI_API_KEY"]
async fn api_smoke_live_gemini() {
    let config = RunnerConfig::discover(".env").unwrap();
    let runner = PromptRunner::new(&config).unwrap();

    let mut out = Vec::new();
    let text = runner.run(&mut out).await.unwrap();
    // Model output is non-deterministic; only shape is checked.
    assert!(!text.trim().is_empty());
    assert_eq!(out.len(), text.len() + 1);
}
