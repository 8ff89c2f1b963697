use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Structured body used for 401/403 rejections and the health probe's 503.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Handler-level failure. Everything that is not an authorization failure
/// collapses to a 400 with a human-readable reason.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("forbidden")]
    Forbidden,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(ErrorBody::new(
                    "Forbidden",
                    "You are not allowed to perform this action.",
                )),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_keeps_its_reason() {
        let err = ApiError::bad_request("User not found!");
        assert_eq!(err.to_string(), "User not found!");
    }

    #[test]
    fn anyhow_errors_map_to_bad_request() {
        let err: ApiError = anyhow::anyhow!("no rows returned").into();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "no rows returned"));
    }
}
