//! API error responses.
//!
//! Every failure the handlers surface is rendered as
//! `{"status": "error", "error": "..."}` with a matching status code.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    /// 400: missing or invalid input.
    BadRequest(String),
    /// 404, with a hint for the user.
    NotFound { message: String, suggestion: String },
    /// 503: an upstream dependency could not serve the request.
    Upstream(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    status: &'static str,
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<&'a str>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(message)
            | ApiError::Upstream(message)
            | ApiError::NotFound { message, .. } => message,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status_code().as_u16(), self.message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let suggestion = match &self {
            ApiError::NotFound { suggestion, .. } => Some(suggestion.as_str()),
            _ => None,
        };
        let body = ErrorBody {
            status: "error",
            error: self.message(),
            suggestion,
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::BadRequest("Request must be JSON".into())
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}
