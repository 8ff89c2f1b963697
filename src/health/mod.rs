use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::error;

use crate::{error::ErrorBody, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health — 204 when the database answers, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!(error = %e, "database health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorBody::new(
                    "Database Unavailable",
                    "Database is currently unavailable. Please try again later.",
                )),
            )
                .into_response()
        }
    }
}
