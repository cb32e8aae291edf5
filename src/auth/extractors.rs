use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Uri},
};
use serde::Deserialize;
use tracing::warn;

use crate::{error::AppError, state::AppState};

/// Caller identity for owner-scoped routes.
///
/// A valid bearer token always wins. Without one, the request is rejected
/// unless trusted-local mode is on, in which case `?userId=` (default `1`)
/// is taken at face value.
#[derive(Debug, Clone, Copy)]
pub struct Identity(pub i64);

/// Caller identity proven by a bearer token; never falls back.
#[derive(Debug, Clone, Copy)]
pub struct BearerUser(pub i64);

#[derive(Deserialize)]
struct UserIdParam {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then_some(token)
}

fn uid_from_bearer(parts: &Parts, state: &AppState) -> Option<i64> {
    let token = bearer_token(parts)?;
    match state.keys.verify(token) {
        Ok(claims) => Some(claims.uid),
        Err(e) => {
            warn!(error = %e, "invalid or expired token");
            None
        }
    }
}

/// Mirrors the legacy behaviour: anything unparseable becomes user 1.
fn uid_from_query(uri: &Uri) -> i64 {
    axum::extract::Query::<UserIdParam>::try_from_uri(uri)
        .ok()
        .and_then(|q| q.0.user_id)
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(1)
}

#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(uid) = uid_from_bearer(parts, state) {
            return Ok(Identity(uid));
        }
        if state.config.trust_user_id_param {
            return Ok(Identity(uid_from_query(&parts.uri)));
        }
        Err(AppError::Auth("authentication required".into()))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for BearerUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        uid_from_bearer(parts, state)
            .map(BearerUser)
            .ok_or_else(|| AppError::Auth("no/invalid token".into()))
    }
}
