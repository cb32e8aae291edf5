use axum::{extract::State, routing::get, Router};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::repo::{self, Goal};
use crate::{
    auth::extractors::Identity,
    error::AppResult,
    extract::Json,
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct PutGoalRequest {
    pub progress: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct PutGoalResponse {
    pub ok: bool,
    pub progress: f64,
}

pub fn goal_routes() -> Router<AppState> {
    Router::new().route("/goal", get(get_goal).put(put_goal))
}

#[instrument(skip(state))]
pub async fn get_goal(
    State(state): State<AppState>,
    Identity(user_id): Identity,
) -> AppResult<Json<Goal>> {
    let goal = repo::find(&state.db, user_id).await?.unwrap_or(Goal {
        user_id,
        progress: 0.0,
    });
    Ok(Json(goal))
}

#[instrument(skip(state, body))]
pub async fn put_goal(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Json(body): Json<PutGoalRequest>,
) -> AppResult<Json<PutGoalResponse>> {
    let progress = body.progress.unwrap_or(0.0);
    repo::upsert(&state.db, user_id, progress).await?;
    Ok(Json(PutGoalResponse { ok: true, progress }))
}
