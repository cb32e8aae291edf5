use axum::{
    extract::State,
    routing::get,
    Router,
};
use tracing::{info, instrument};

use super::dto::UpdateProfileRequest;
use super::repo::{Profile, ProfilePatch};
use crate::{
    auth::extractors::Identity,
    envelope::{ack, Ack},
    error::{AppError, AppResult},
    extract::Json,
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(put_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    Identity(user_id): Identity,
) -> AppResult<Json<Profile>> {
    let profile = Profile::find(&state.db, user_id)
        .await?
        .unwrap_or_else(|| Profile::placeholder(user_id));
    Ok(Json(profile))
}

#[instrument(skip(state, body))]
pub async fn put_profile(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<Ack>> {
    let patch = ProfilePatch {
        display_name: body.display_name,
        email: body
            .email
            .map(|e| e.map(|e| e.trim().to_lowercase()).filter(|e| !e.is_empty())),
        avatar_url: body.avatar_url,
        bio: body.bio,
    };
    if patch.is_empty() {
        return Err(AppError::validation("no fields"));
    }

    patch.apply(&state.db, user_id).await?;
    info!(user_id, "profile saved");
    Ok(ack())
}
