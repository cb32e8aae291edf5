use axum::{extract::State, routing::get, Router};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::instrument;

use crate::{error::AppResult, extract::Json, state::AppState};

#[derive(Debug, Serialize)]
pub struct Ping {
    pub ok: bool,
    pub ts: f64,
}

#[derive(Debug, Serialize)]
pub struct DbCheck {
    pub ok: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/__ping", get(ping))
        .route("/__dbcheck", get(dbcheck))
}

pub async fn ping() -> Json<Ping> {
    let now = OffsetDateTime::now_utc();
    Json(Ping {
        ok: true,
        ts: now.unix_timestamp_nanos() as f64 / 1e9,
    })
}

#[instrument(skip(state))]
pub async fn dbcheck(State(state): State<AppState>) -> AppResult<Json<DbCheck>> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await?;
    Ok(Json(DbCheck { ok: true }))
}
