// Request-level error kinds and their HTTP mapping
//
// Knowledge loading failures are deliberately absent: they degrade to a
// placeholder block (see `knowledge`) and never reach the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced to the HTTP caller
#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("upstream generation failed: {0}")]
    UpstreamFailure(String),
}

/// JSON body returned for every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ProcessorError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidRequest(_) | Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UpstreamFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body sent to the caller. Messages are in the frontend's language.
    pub fn body(&self) -> ErrorBody {
        match self {
            Self::MethodNotAllowed => ErrorBody {
                error: "Método no permitido".to_string(),
                details: None,
            },
            Self::InvalidRequest(reason) => ErrorBody {
                error: "Debes proporcionar un prompt o una imagen".to_string(),
                details: Some(reason.clone()),
            },
            Self::MalformedBody(reason) => ErrorBody {
                error: "Cuerpo JSON inválido".to_string(),
                details: Some(reason.clone()),
            },
            Self::PayloadTooLarge(reason) => ErrorBody {
                error: "La solicitud es demasiado grande".to_string(),
                details: Some(reason.clone()),
            },
            Self::UpstreamFailure(message) => ErrorBody {
                error: "Error al procesar la solicitud".to_string(),
                details: Some(message.clone()),
            },
        }
    }
}

impl IntoResponse for ProcessorError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
