use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::auth::dto::{AuthResponse, JwtKeys, LoginRequest, RegisterRequest};
use crate::auth::repo_types::{Role, User};
use crate::auth::services::{hash_password, is_valid_email, verify_password};
use crate::error::{is_unique_violation, ApiError};
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let (Some(email), Some(password), Some(role_raw)) = (
        non_empty(payload.email.as_deref()),
        non_empty(payload.password.as_deref()),
        non_empty(payload.role.as_deref()),
    ) else {
        warn!("register with missing fields");
        return Err(ApiError::BadRequest("missing required fields".into()));
    };

    let Some(role) = Role::parse(role_raw) else {
        warn!(role = %role_raw, "register with invalid role");
        return Err(ApiError::BadRequest("invalid role".into()));
    };

    if !is_valid_email(email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::BadRequest("invalid email".into()));
    }

    if User::find_by_email(&state.db, email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict("email already registered".into()));
    }

    let hash = hash_password(password)?;

    let user = match User::create(&state.db, email, &hash, role).await {
        Ok(u) => u,
        // Pre-check raced with a concurrent registration; the unique index
        // on email decides the winner.
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %email, "email already registered");
            return Err(ApiError::Conflict("email already registered".into()));
        }
        Err(e) => return Err(e.into()),
    };

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, user.role)?;

    info!(user_id = %user.id, email = %user.email, role = ?user.role, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            role: user.role,
            uid: user.id,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (Some(email), Some(password)) = (
        non_empty(payload.email.as_deref()),
        non_empty(payload.password.as_deref()),
    ) else {
        warn!("login with missing fields");
        return Err(ApiError::BadRequest("email and password required".into()));
    };

    // Unknown email and wrong password answer with the same message so the
    // response does not reveal whether the account exists.
    let Some(user) = User::find_by_email(&state.db, email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(ApiError::Unauthorized("invalid credentials".into()));
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("invalid credentials".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, user.role)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        token,
        role: user.role,
        uid: user.id,
    }))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
