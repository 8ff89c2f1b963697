use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    accounts::repo::User,
    auth::{dto::LoginRequest, jwt::JwtKeys},
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// POST /login — password authentication, returns the bearer token string.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<String, ApiError> {
    if !User::exists_by_login(&state.db, &payload.login).await?
        || !User::is_active(&state.db, &payload.login).await?
    {
        warn!(login = %payload.login, "login for unknown or revoked user");
        return Err(ApiError::bad_request("User not found or deleted!"));
    }

    let claims_data = match User::verify_credentials(&state.db, &payload.login, &payload.password)
        .await?
    {
        Some(data) => data,
        None => {
            warn!(login = %payload.login, "login with wrong password");
            return Err(ApiError::bad_request("Wrong password!"));
        }
    };

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&claims_data.login, claims_data.admin)?;

    info!(login = %claims_data.login, "user logged in");
    Ok(token)
}
