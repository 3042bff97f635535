// Request handlers

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use super::AppState;
use crate::error::ProcessorError;
use crate::prompt::{PromptRequest, PromptRequestBody};

/// POST handler: parse, assemble, dispatch, return generated text as plain text
pub async fn handle_generate(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<String, ProcessorError> {
    let body = body.map_err(body_rejection)?;
    let body: PromptRequestBody = serde_json::from_slice(&body)
        .map_err(|e| ProcessorError::MalformedBody(e.to_string()))?;
    let request = PromptRequest::from_body(body);

    let knowledge = state.knowledge().block().await;
    state.dispatcher().process(&request, &knowledge).await
}

/// Body buffering failures, including the configured size limit
fn body_rejection(rejection: BytesRejection) -> ProcessorError {
    let reason = rejection.body_text();
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ProcessorError::PayloadTooLarge(reason)
    } else {
        ProcessorError::MalformedBody(reason)
    }
}

/// Bare OPTIONS (CORS preflights are answered by the CORS layer)
pub async fn handle_preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Any other method on the processing endpoint
pub async fn method_not_allowed() -> ProcessorError {
    ProcessorError::MethodNotAllowed
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub provider: String,
    pub model: String,
    pub knowledge_files: usize,
    pub knowledge_degraded: bool,
}

/// Liveness probe reporting knowledge and model state
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let knowledge = state.knowledge().block().await;
    let dispatcher = state.dispatcher();

    Json(HealthResponse {
        status: "ok",
        provider: dispatcher.provider_name().to_string(),
        model: dispatcher.policy().model.clone(),
        knowledge_files: knowledge.files().len(),
        knowledge_degraded: knowledge.is_degraded(),
    })
}
