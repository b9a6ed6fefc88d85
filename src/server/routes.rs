//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::Error;
use crate::pipeline::AskResponse;
use crate::version;

use super::AppState;

/// `POST /ask` request body.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub prompt: String,
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self.format_for_log(), "Request failed");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().as_str(),
        };
        (status, Json(body)).into_response()
    }
}

/// Answer a question through triage and the selected agents.
pub async fn ask(
    State(state): State<Arc<AppState>>,
    request: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, Error> {
    let Json(request) = request.map_err(|rejection| Error::InvalidRequest(rejection.body_text()))?;
    let response = state.matcher.ask(&request.prompt).await?;
    Ok(Json(response))
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: String,
    pub agents: Vec<String>,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let registry = state.matcher.registry();

    Json(HealthResponse {
        status: "healthy",
        version: version::build_info().short_version(),
        uptime_seconds: state.uptime_seconds(),
        model: state.matcher.model_id().to_string(),
        agents: registry.names().into_iter().map(String::from).collect(),
    })
}
