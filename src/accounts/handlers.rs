use axum::{
    extract::{FromRef, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post, put},
    Json, Router,
};
use sqlx::PgPool;
use tracing::{error, info, instrument, warn};

use crate::{
    accounts::{
        dto::{
            AgeQuery, CreatedUser, DeleteUserRequest, LoginQuery, RegistrationRequest, ShortUser,
            UpdateLoginQuery, UpdatePasswordRequest, UpdateUserRequest, UpdatedLoginResponse,
            UserView,
        },
        repo::User,
        validate,
    },
    auth::{
        dto::LoginRequest,
        jwt::{AdminUser, AuthUser, JwtKeys},
        password,
    },
    error::ApiError,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/update-user", put(update_user))
        .route("/update-login", put(update_login))
        .route("/update-password", put(update_password))
        .route("/profile", get(profile))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/registration", post(register))
        .route("/active-users", get(active_users))
        .route("/user-short-data", get(user_short_data))
        .route("/user-oldes", get(users_over_age))
        .route("/delete", delete(delete_user))
        .route("/user-recovery", put(recover_user))
}

const LOGIN_FORMAT_MSG: &str =
    "Login is not correct! All characters except Latin letters and numbers are prohibited!";
const PASSWORD_FORMAT_MSG: &str =
    "Password is not correct! All characters except Latin letters and numbers are prohibited!";
const NAME_FORMAT_MSG: &str =
    "Name is not correct! All characters except Latin and Russian letters are prohibited!";
const GENDER_FORMAT_MSG: &str = "Gender is not correct! 0 - female, 1 - male, 2 - unknown!";

/// The actor behind a mutation must still exist and must not be revoked.
async fn ensure_actor_active(db: &PgPool, login: &str) -> Result<(), ApiError> {
    if !User::exists_by_login(db, login).await? || !User::is_active(db, login).await? {
        warn!(login = %login, "request from a missing or revoked actor");
        return Err(ApiError::bad_request("Logged in user is not active!"));
    }
    Ok(())
}

/// An Admin may not act on a revoked subject; acting on oneself is exempt
/// because the actor-active check already covered it.
async fn ensure_subject_active_for_admin(
    db: &PgPool,
    actor: &AuthUser,
    subject: &str,
) -> Result<(), ApiError> {
    if actor.admin && actor.login != subject && !User::is_active(db, subject).await? {
        return Err(ApiError::bad_request("User is not active!"));
    }
    Ok(())
}

/// POST /registration — Admin creates a user.
#[instrument(skip(state, admin, payload))]
pub async fn register(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<RegistrationRequest>,
) -> Result<(StatusCode, HeaderMap, Json<CreatedUser>), ApiError> {
    if !validate::login_is_correct(&payload.login) {
        return Err(ApiError::bad_request(LOGIN_FORMAT_MSG));
    }
    if !validate::password_is_correct(&payload.password) {
        return Err(ApiError::bad_request(PASSWORD_FORMAT_MSG));
    }
    if !validate::name_is_correct(&payload.name) {
        return Err(ApiError::bad_request(NAME_FORMAT_MSG));
    }
    if !validate::gender_is_correct(payload.gender) {
        return Err(ApiError::bad_request(GENDER_FORMAT_MSG));
    }
    if User::exists_by_login(&state.db, &payload.login).await? {
        warn!(login = %payload.login, "registration for taken login");
        return Err(ApiError::bad_request(
            "The user with this login already exists!",
        ));
    }

    let hash = password::hash_password(&payload.password)?;
    if !User::create(&state.db, &payload, &hash, &admin.login).await? {
        error!(login = %payload.login, "user insert affected no rows");
        return Err(ApiError::bad_request("No correct data!"));
    }

    let created = CreatedUser::from(User::get_by_login(&state.db, &payload.login).await?);

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::LOCATION,
        format!("/user-short-data?login={}", created.login)
            .parse()
            .expect("login is alphanumeric"),
    );

    info!(login = %created.login, created_by = %admin.login, "user registered");
    Ok((StatusCode::CREATED, headers, Json(created)))
}

/// PUT /update-user — change name, gender or birthday; Admin or self.
#[instrument(skip(state, auth, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserView>, ApiError> {
    ensure_actor_active(&state.db, &auth.login).await?;

    if !User::exists_by_login(&state.db, &payload.login).await? {
        return Err(ApiError::bad_request("User not found!"));
    }
    ensure_subject_active_for_admin(&state.db, &auth, &payload.login).await?;

    if let Some(name) = payload.name.as_deref().filter(|n| !n.is_empty()) {
        if !validate::name_is_correct(name) {
            return Err(ApiError::bad_request(NAME_FORMAT_MSG));
        }
    }
    if let Some(gender) = payload.gender {
        if !validate::gender_is_correct(gender) {
            return Err(ApiError::bad_request(GENDER_FORMAT_MSG));
        }
    }

    if !auth.admin && auth.login != payload.login {
        return Err(ApiError::Forbidden);
    }

    if !User::update_profile(&state.db, &payload, &auth.login).await? {
        return Err(ApiError::bad_request("The user could not be updated."));
    }

    info!(login = %payload.login, acting = %auth.login, "user profile updated");
    let user = User::get_by_login(&state.db, &payload.login).await?;
    Ok(Json(UserView::from(user)))
}

/// PUT /update-login — rename a user; Admin or self. A self-rename returns a
/// fresh token, since the old one carries the stale login.
#[instrument(skip(state, auth))]
pub async fn update_login(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<UpdateLoginQuery>,
) -> Result<Json<UpdatedLoginResponse>, ApiError> {
    // Renaming to the same login is a no-op success.
    if query.old_login == query.new_login {
        return Ok(Json(UpdatedLoginResponse {
            metadata: None,
            token: None,
        }));
    }

    ensure_actor_active(&state.db, &auth.login).await?;

    if !User::exists_by_login(&state.db, &query.old_login).await? {
        return Err(ApiError::bad_request("User not found!"));
    }
    ensure_subject_active_for_admin(&state.db, &auth, &query.old_login).await?;

    if !validate::login_is_correct(&query.new_login) {
        return Err(ApiError::bad_request(
            "New login is not correct! All characters except Latin letters and numbers are prohibited!",
        ));
    }
    if User::exists_by_login(&state.db, &query.new_login).await? {
        warn!(new_login = %query.new_login, "login change to a taken login");
        return Err(ApiError::bad_request(
            "The user with your new login already exists!",
        ));
    }

    if !auth.admin && auth.login != query.old_login {
        return Err(ApiError::Forbidden);
    }

    if !User::change_login(&state.db, &query.old_login, &query.new_login, &auth.login).await? {
        return Err(ApiError::bad_request("The user could not be updated."));
    }

    let metadata = UserView::from(User::get_by_login(&state.db, &query.new_login).await?);

    let token = if auth.login == query.old_login {
        let claims_data = User::get_claims_data(&state.db, &query.new_login).await?;
        let keys = JwtKeys::from_ref(&state);
        Some(keys.sign(&claims_data.login, claims_data.admin)?)
    } else {
        None
    };

    info!(old_login = %query.old_login, new_login = %query.new_login, acting = %auth.login, "login changed");
    Ok(Json(UpdatedLoginResponse {
        metadata: Some(metadata),
        token,
    }))
}

/// PUT /update-password — Admin or self; confirmation must match.
#[instrument(skip(state, auth, payload))]
pub async fn update_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<String, ApiError> {
    ensure_actor_active(&state.db, &auth.login).await?;

    if !User::exists_by_login(&state.db, &payload.login).await? {
        return Err(ApiError::bad_request("User not found!"));
    }
    ensure_subject_active_for_admin(&state.db, &auth, &payload.login).await?;

    if !validate::password_is_correct(&payload.password) {
        return Err(ApiError::bad_request(PASSWORD_FORMAT_MSG));
    }
    if !validate::password_is_correct(&payload.confirm_password) {
        return Err(ApiError::bad_request(
            "ConfirmPassword is not correct! All characters except Latin letters and numbers are prohibited!",
        ));
    }
    if payload.password != payload.confirm_password {
        return Err(ApiError::bad_request("Passwords don't match"));
    }

    if !auth.admin && auth.login != payload.login {
        return Err(ApiError::Forbidden);
    }

    let hash = password::hash_password(&payload.password)?;
    if !User::change_password(&state.db, &payload.login, &hash, &auth.login).await? {
        return Err(ApiError::bad_request(
            "The user password could not be updated.",
        ));
    }

    info!(login = %payload.login, acting = %auth.login, "password changed");
    Ok("Password update success!".into())
}

/// GET /active-users — Admin only, ordered by creation time.
#[instrument(skip(state, _admin))]
pub async fn active_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserView>>, ApiError> {
    let users = User::list_active(&state.db).await?;
    Ok(Json(users.into_iter().map(UserView::from).collect()))
}

/// GET /user-short-data?login= — Admin only.
#[instrument(skip(state, _admin))]
pub async fn user_short_data(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<LoginQuery>,
) -> Result<Json<ShortUser>, ApiError> {
    if !validate::login_is_correct(&query.login) {
        return Err(ApiError::bad_request(LOGIN_FORMAT_MSG));
    }
    if !User::exists_by_login(&state.db, &query.login).await? {
        return Err(ApiError::bad_request("User not found!"));
    }
    let short = User::get_short(&state.db, &query.login).await?;
    Ok(Json(short))
}

/// GET /profile?login=&password= — a user reads their own record, with the
/// password re-verified on top of the bearer token.
#[instrument(skip(state, auth, query))]
pub async fn profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<LoginRequest>,
) -> Result<Json<UserView>, ApiError> {
    if auth.login != query.login {
        return Err(ApiError::bad_request(
            "The login of authorization and the provided login do not match!",
        ));
    }
    if !User::exists_by_login(&state.db, &query.login).await?
        || !User::is_active(&state.db, &query.login).await?
    {
        return Err(ApiError::bad_request("User not found or deleted!"));
    }
    if User::verify_credentials(&state.db, &query.login, &query.password)
        .await?
        .is_none()
    {
        warn!(login = %query.login, "profile request with wrong password");
        return Err(ApiError::bad_request("Invalid password!"));
    }

    let user = User::get_by_login(&state.db, &auth.login).await?;
    Ok(Json(UserView::from(user)))
}

const DEFAULT_AGE_THRESHOLD: i32 = 10;

/// The threshold must stay within 0..=100; absent means the default.
fn age_threshold(requested: Option<i32>) -> Option<i32> {
    let age = requested.unwrap_or(DEFAULT_AGE_THRESHOLD);
    (0..=100).contains(&age).then_some(age)
}

/// GET /user-oldes?age= — Admin only, users strictly older than the threshold.
#[instrument(skip(state, _admin))]
pub async fn users_over_age(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<AgeQuery>,
) -> Result<Json<Vec<UserView>>, ApiError> {
    let age = age_threshold(query.age).ok_or_else(|| ApiError::bad_request("No correct age!"))?;
    let users = User::list_over_age(&state.db, age).await?;
    Ok(Json(users.into_iter().map(UserView::from).collect()))
}

/// DELETE /delete — Admin only; soft sets Revoked*, hard removes the row.
#[instrument(skip(state, admin, payload))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<DeleteUserRequest>,
) -> Result<String, ApiError> {
    if !User::exists_by_login(&state.db, &payload.login).await? {
        return Err(ApiError::bad_request("User not found!"));
    }

    let variant = if payload.soft_delete {
        if !User::is_active(&state.db, &payload.login).await? {
            return Ok("Deleting user is not active!".into());
        }
        if !User::soft_delete(&state.db, &payload.login, &admin.login).await? {
            return Err(ApiError::bad_request("The user has not been deleted."));
        }
        "soft"
    } else {
        if !User::hard_delete(&state.db, &payload.login).await? {
            return Err(ApiError::bad_request("The user has not been deleted."));
        }
        "hard"
    };

    info!(login = %payload.login, variant, acting = %admin.login, "user deleted");
    Ok(format!(
        "The {variant} removal user \"{}\" was successful!",
        payload.login
    ))
}

/// PUT /user-recovery?login= — Admin only; clears Revoked*.
#[instrument(skip(state, admin))]
pub async fn recover_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(query): Query<LoginQuery>,
) -> Result<String, ApiError> {
    if !validate::login_is_correct(&query.login) {
        return Err(ApiError::bad_request(LOGIN_FORMAT_MSG));
    }
    if !User::exists_by_login(&state.db, &query.login).await? {
        return Err(ApiError::bad_request("User not found!"));
    }
    if User::is_active(&state.db, &query.login).await? {
        return Ok("User doesn't soft deleted.".into());
    }

    if !User::recover(&state.db, &query.login, &admin.login).await? {
        return Err(ApiError::bad_request("The user has not been recovered."));
    }

    info!(login = %query.login, acting = %admin.login, "user recovered");
    Ok("The user's recovery was successful!".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_threshold_defaults_to_ten() {
        assert_eq!(age_threshold(None), Some(10));
    }

    #[test]
    fn age_threshold_accepts_bounds_inclusive() {
        assert_eq!(age_threshold(Some(0)), Some(0));
        assert_eq!(age_threshold(Some(100)), Some(100));
        assert_eq!(age_threshold(Some(42)), Some(42));
    }

    #[test]
    fn age_threshold_rejects_out_of_range() {
        assert_eq!(age_threshold(Some(-1)), None);
        assert_eq!(age_threshold(Some(101)), None);
        assert_eq!(age_threshold(Some(150)), None);
    }
}
