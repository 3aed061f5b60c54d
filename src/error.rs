//! The single error type the HTTP surface maps to status codes.
//!
//! Every other layer returns its own narrower error (`SessionError`,
//! `CommandError`); the command façade is the one place that folds them
//! into this and it's the only place that performs the HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::commands::CommandError;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("charge point not connected")]
    NotConnected,
    #[error("charge point did not respond in time")]
    GatewayTimeout,
    #[error("charge point rejected the request: {0}")]
    ServiceUnavailable(String),
}

impl From<CommandError> for GatewayError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::BadRequest(msg) => GatewayError::BadRequest(msg),
            CommandError::NotConnected | CommandError::SendFailed(_) => GatewayError::NotConnected,
            CommandError::Timeout => GatewayError::GatewayTimeout,
            CommandError::Disconnected => {
                GatewayError::ServiceUnavailable("station disconnected mid-call".to_string())
            }
            CommandError::CallError { code, description } => {
                GatewayError::ServiceUnavailable(format!("{code}: {description}"))
            }
            CommandError::InvalidResponse(msg) => GatewayError::ServiceUnavailable(msg),
            CommandError::UnsupportedVersion => {
                GatewayError::BadRequest("action not supported for this OCPP version".to_string())
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            GatewayError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            GatewayError::NotConnected => (StatusCode::NOT_FOUND, self.to_string()),
            GatewayError::GatewayTimeout => (StatusCode::GATEWAY_TIMEOUT, self.to_string()),
            GatewayError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
        };
        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}
