// HTTP error mapping for the kata API

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use kata_common::error::{CatalogError, ExecutionError, HarnessError, ParseError, StoreError};
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    /// Missing or unusable request field
    Validation(String),
    NotFound(String),
    /// Case text or signature metadata could not be decoded
    Parse(String),
    /// Upstream service answered with a failure; status and body are forwarded as-is
    Upstream { status: u16, body: String },
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Upstream { status, body } => {
                // A 2xx without the expected payload is still a failure for our caller
                let status = StatusCode::from_u16(status)
                    .ok()
                    .filter(|s| !s.is_success())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                let content_type = if serde_json::from_str::<serde_json::Value>(&body).is_ok() {
                    "application/json"
                } else {
                    "text/plain; charset=utf-8"
                };
                return (status, [(header::CONTENT_TYPE, content_type)], body).into_response();
            }
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Parse(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            ApiError::Internal(message) => {
                error!(error = %message, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        ApiError::Parse(err.to_string())
    }
}

impl From<HarnessError> for ApiError {
    fn from(err: HarnessError) -> Self {
        match err {
            HarnessError::Encode(_) | HarnessError::Template(_) => ApiError::Internal(err.to_string()),
            other => ApiError::Parse(other.to_string()),
        }
    }
}

impl From<ExecutionError> for ApiError {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::Submit { status, body } | ExecutionError::Poll { status, body } => {
                ApiError::Upstream { status, body }
            }
            ExecutionError::MissingToken => ApiError::Validation("Missing token".to_string()),
            ExecutionError::Transport(e) => ApiError::Upstream {
                status: StatusCode::BAD_GATEWAY.as_u16(),
                body: json!({ "error": e.to_string() }).to_string(),
            },
            ExecutionError::Decode(message) => ApiError::Internal(message),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Upstream { status, body } => ApiError::Upstream { status, body },
            CatalogError::Transport(e) => ApiError::Upstream {
                status: StatusCode::BAD_GATEWAY.as_u16(),
                body: json!({ "error": e.to_string() }).to_string(),
            },
            CatalogError::Decode(message) => ApiError::Internal(message),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(message) => ApiError::Validation(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
