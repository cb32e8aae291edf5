use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, SignupRequest},
        extractors::BearerUser,
        password::{hash_password, verify_password},
        repo::Credentials,
    },
    error::{AppError, AppResult},
    extract::Json,
    profile::repo::Profile,
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

fn normalize_email(raw: Option<String>) -> String {
    raw.unwrap_or_default().trim().to_lowercase()
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let email = normalize_email(payload.email);
    let password = payload.password.unwrap_or_default();
    let display_name = payload
        .display_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "User".to_string());

    if email.is_empty() || password.is_empty() {
        return Err(AppError::validation("email and password required"));
    }

    if Credentials::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("email already in use".into()));
    }

    let hash = hash_password(&password)?;
    let Some(user_id) = Credentials::create(&state.db, &email, &display_name, &hash).await? else {
        warn!(email = %email, "email registered concurrently");
        return Err(AppError::Conflict("email already in use".into()));
    };

    let token = state.keys.sign(user_id)?;
    info!(user_id, email = %email, "user signed up");
    Ok((StatusCode::CREATED, Json(AuthResponse { user_id, token })))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = normalize_email(payload.email);
    let password = payload.password.unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::validation("email and password required"));
    }

    let creds = Credentials::find_by_email(&state.db, &email).await?;
    let Some(Credentials {
        id: user_id,
        password_hash: Some(hash),
    }) = creds
    else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
    };

    if !verify_password(&password, &hash) {
        warn!(user_id, "login invalid password");
        return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
    }

    let token = state.keys.sign(user_id)?;
    info!(user_id, "user logged in");
    Ok(Json(AuthResponse { user_id, token }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    BearerUser(user_id): BearerUser,
) -> AppResult<Json<Profile>> {
    let profile = Profile::find(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))?;
    Ok(Json(profile))
}
