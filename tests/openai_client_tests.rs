//! Chat-completions client tests against a fake upstream
//!
//! Covers the wire format, authentication and error mapping, and a full
//! question flow over real HTTP on both sides.

mod common;

use std::sync::Arc;

use agent_matcher::config::OpenAiSettings;
use agent_matcher::error::Error;
use agent_matcher::llm::{ChatMessage, ChatModel, OpenAiClient};
use tempfile::TempDir;

use common::{spawn_app, FakeUpstream, Reply};

fn settings(base_url: &str, api_key: &str) -> OpenAiSettings {
    OpenAiSettings {
        base_url: base_url.to_string(),
        api_key: api_key.to_string(),
        model: "test-model".to_string(),
        timeout_secs: 10,
    }
}

fn question() -> Vec<ChatMessage> {
    vec![
        ChatMessage::system("You are a helpful assistant."),
        ChatMessage::user("Hello?"),
    ]
}

// ─────────────────────────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_complete_returns_first_choice() {
    let upstream = FakeUpstream::start([Reply::content("Hi there.")]).await;
    let client = OpenAiClient::new(&settings(&upstream.base_url, "sk-test")).unwrap();

    let reply = client.complete(&question()).await.unwrap();
    assert_eq!(reply, "Hi there.");
    assert_eq!(upstream.call_count(), 1);
}

#[tokio::test]
async fn test_request_body_and_auth_header() {
    let upstream = FakeUpstream::start([Reply::content("ok")]).await;
    let client = OpenAiClient::new(&settings(&upstream.base_url, "sk-test")).unwrap();

    client.complete(&question()).await.unwrap();

    let requests = upstream.requests();
    assert_eq!(requests[0]["model"], "test-model");
    let messages = requests[0]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[0]["content"], "You are a helpful assistant.");
    assert_eq!(messages[1]["role"], "user");
    assert_eq!(messages[1]["content"], "Hello?");

    assert_eq!(upstream.auth_headers(), vec![Some("Bearer sk-test".to_string())]);
}

#[tokio::test]
async fn test_no_auth_header_without_key() {
    let upstream = FakeUpstream::start([Reply::content("ok")]).await;
    let client = OpenAiClient::new(&settings(&upstream.base_url, "")).unwrap();

    client.complete(&question()).await.unwrap();
    assert_eq!(upstream.auth_headers(), vec![None]);
}

#[tokio::test]
async fn test_trailing_slash_in_base_url() {
    let upstream = FakeUpstream::start([Reply::content("ok")]).await;
    let base = format!("{}/", upstream.base_url);
    let client = OpenAiClient::new(&settings(&base, "")).unwrap();

    assert_eq!(client.complete(&question()).await.unwrap(), "ok");
}

#[tokio::test]
async fn test_null_content_is_empty_string() {
    let upstream = FakeUpstream::start([Reply::NullContent]).await;
    let client = OpenAiClient::new(&settings(&upstream.base_url, "")).unwrap();

    assert_eq!(client.complete(&question()).await.unwrap(), "");
}

// ─────────────────────────────────────────────────────────────────
// Error mapping
// ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_status_is_upstream_error() {
    let upstream = FakeUpstream::start([Reply::Status(
        401,
        r#"{"error": {"message": "Incorrect API key provided"}}"#.to_string(),
    )])
    .await;
    let client = OpenAiClient::new(&settings(&upstream.base_url, "sk-bad")).unwrap();

    let err = client.complete(&question()).await.unwrap_err();
    assert!(matches!(err, Error::Upstream { .. }));
    let message = err.to_string();
    assert!(message.contains("401"));
    assert!(message.contains("Incorrect API key provided"));
}

#[tokio::test]
async fn test_no_choices_is_upstream_error() {
    let upstream = FakeUpstream::start([Reply::NoChoices]).await;
    let client = OpenAiClient::new(&settings(&upstream.base_url, "")).unwrap();

    let err = client.complete(&question()).await.unwrap_err();
    assert!(matches!(err, Error::Upstream { .. }));
    assert!(err.to_string().contains("No choices"));
}

#[tokio::test]
async fn test_non_json_body_is_upstream_error() {
    let upstream = FakeUpstream::start([Reply::Status(200, "not json".to_string())]).await;
    let client = OpenAiClient::new(&settings(&upstream.base_url, "")).unwrap();

    let err = client.complete(&question()).await.unwrap_err();
    assert!(matches!(err, Error::Upstream { .. }));
}

// ─────────────────────────────────────────────────────────────────
// Full flow
// ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ask_end_to_end() {
    let upstream = FakeUpstream::start([
        Reply::content(r#"{"agents": ["Web Developer"], "reason": "technical"}"#),
        Reply::content("We build with Rust and React."),
    ])
    .await;
    let client = OpenAiClient::new(&settings(&upstream.base_url, "sk-test")).unwrap();

    let dir = TempDir::new().unwrap();
    let app = spawn_app(Arc::new(client), &dir.path().join("interactions.json")).await;

    let response = reqwest::Client::new()
        .post(app.url("/ask"))
        .json(&serde_json::json!({ "prompt": "What is your tech stack?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["agents_involved"], serde_json::json!(["Web Developer"]));
    assert_eq!(
        body["final_answer"],
        "[Web Developer]: We build with Rust and React."
    );

    let requests = upstream.requests();
    assert_eq!(requests.len(), 2);

    // Triage call: triage role, company context, then the question
    let triage = requests[0]["messages"].as_array().unwrap();
    assert_eq!(triage.len(), 3);
    assert!(triage[0]["content"].as_str().unwrap().contains("triage"));
    assert!(triage[1]["content"].as_str().unwrap().contains("Cybruxer"));
    assert!(triage[2]["content"]
        .as_str()
        .unwrap()
        .contains("What is your tech stack?"));

    // Agent call: persona, company context, then the raw question
    let agent = requests[1]["messages"].as_array().unwrap();
    assert!(agent[0]["content"].as_str().unwrap().starts_with("You are Web Developer."));
    assert_eq!(
        agent.last().unwrap()["content"],
        "What is your tech stack?"
    );

    assert_eq!(app.history.load().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_ask_agent_failure_returns_raw_upstream_text() {
    let upstream = FakeUpstream::start([
        Reply::content(r#"{"agents": ["Salesperson"]}"#),
        Reply::Status(429, "Rate limit reached".to_string()),
    ])
    .await;
    let client = OpenAiClient::new(&settings(&upstream.base_url, "sk-test")).unwrap();

    let dir = TempDir::new().unwrap();
    let app = spawn_app(Arc::new(client), &dir.path().join("interactions.json")).await;

    let response = reqwest::Client::new()
        .post(app.url("/ask"))
        .json(&serde_json::json!({ "prompt": "Price?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Rate limit reached"));
    assert!(app.history.load().await.unwrap().is_empty());
}
