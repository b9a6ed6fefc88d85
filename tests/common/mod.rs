//! Common test utilities and fixtures
//!
//! Config fixtures, an in-process agent-matcher server and a fake
//! OpenAI-compatible upstream.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use agent_matcher::history::{HistoryFormat, HistoryStore};
use agent_matcher::llm::SharedChatModel;
use agent_matcher::persona::PersonaRegistry;
use agent_matcher::pipeline::AgentMatcher;
use agent_matcher::server::{create_router, AppState};
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;

// ─────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

// ─────────────────────────────────────────────────────────────────
// In-process agent-matcher server
// ─────────────────────────────────────────────────────────────────

/// A running API server bound to an ephemeral port
pub struct TestApp {
    pub base_url: String,
    pub history: Arc<HistoryStore>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Serve the real router in the background with the given model
pub async fn spawn_app(model: SharedChatModel, history_path: &Path) -> TestApp {
    let history = Arc::new(HistoryStore::new(history_path, HistoryFormat::Json));
    let matcher = AgentMatcher::new(model, Arc::new(PersonaRegistry::builtin()), history.clone());
    let router = create_router(Arc::new(AppState::new(matcher)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        base_url: format!("http://{}", addr),
        history,
    }
}

// ─────────────────────────────────────────────────────────────────
// Fake OpenAI-compatible upstream
// ─────────────────────────────────────────────────────────────────

/// One scripted upstream reply
#[derive(Debug, Clone)]
pub enum Reply {
    Content(String),
    NullContent,
    NoChoices,
    Status(u16, String),
}

impl Reply {
    pub fn content(text: &str) -> Self {
        Reply::Content(text.to_string())
    }
}

#[derive(Default)]
struct UpstreamState {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<Value>>,
    auth_headers: Mutex<Vec<Option<String>>>,
}

/// Chat-completions server serving scripted replies in order
pub struct FakeUpstream {
    /// Base URL including the `/v1` prefix
    pub base_url: String,
    state: Arc<UpstreamState>,
}

impl FakeUpstream {
    pub async fn start<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = Reply>,
    {
        let state = Arc::new(UpstreamState::default());
        state.replies.lock().extend(replies);

        let app = Router::new()
            .route("/v1/chat/completions", post(chat_completions))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/v1", addr),
            state,
        }
    }

    /// Request bodies received so far
    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().clone()
    }

    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.state.auth_headers.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.requests.lock().len()
    }
}

async fn chat_completions(
    State(state): State<Arc<UpstreamState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.requests.lock().push(body);
    state.auth_headers.lock().push(
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    );

    let reply = state
        .replies
        .lock()
        .pop_front()
        .unwrap_or_else(|| Reply::content("unscripted reply"));

    match reply {
        Reply::Content(text) => Json(json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": text },
                "finish_reason": "stop"
            }]
        }))
        .into_response(),
        Reply::NullContent => Json(json!({
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": null } }]
        }))
        .into_response(),
        Reply::NoChoices => Json(json!({ "choices": [] })).into_response(),
        Reply::Status(code, body) => {
            let status = StatusCode::from_u16(code).unwrap();
            (status, body).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_dir_exists() {
        assert!(fixtures_dir().exists(), "Fixtures directory should exist");
    }

    #[test]
    fn test_config_fixtures_exist() {
        assert!(valid_config_fixture().exists());
        assert!(invalid_config_fixture().exists());
    }
}
