use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Router,
};
use tracing::instrument;

use super::dto::{CreateEntryRequest, DiaryQuery};
use super::repo::{self, DiaryEntry, NewEntry};
use crate::{
    auth::extractors::Identity,
    coerce::{parse_date_opt, today_utc},
    envelope::{self, Created, Deleted},
    error::{AppError, AppResult},
    extract::{Json, Path, Query},
    state::AppState,
};

pub fn diary_routes() -> Router<AppState> {
    Router::new()
        .route("/diary", get(list_entries).post(create_entry))
        .route("/diary/:id", delete(delete_entry))
}

#[instrument(skip(state))]
pub async fn list_entries(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Query(q): Query<DiaryQuery>,
) -> AppResult<Json<Vec<DiaryEntry>>> {
    let rows = match parse_date_opt(q.date.as_deref(), "date")? {
        Some(day) => repo::list_for_day(&state.db, user_id, day).await?,
        None => repo::list_recent(&state.db, user_id).await?,
    };
    Ok(Json(rows))
}

#[instrument(skip(state, body))]
pub async fn create_entry(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Json(body): Json<CreateEntryRequest>,
) -> AppResult<(StatusCode, Json<Created>)> {
    let title = body.title.as_deref().map(str::trim).unwrap_or_default();
    let content = body.content.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() && content.is_empty() {
        return Err(AppError::validation("title or content required"));
    }
    let entry_date = parse_date_opt(body.date.as_deref(), "date")?.unwrap_or_else(today_utc);

    let id = repo::insert(
        &state.db,
        user_id,
        NewEntry {
            entry_date,
            title,
            content,
            mood: body.mood.as_deref(),
        },
    )
    .await?;
    Ok(envelope::created(id))
}

#[instrument(skip(state))]
pub async fn delete_entry(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(id): Path<i64>,
) -> AppResult<Json<Deleted>> {
    envelope::deleted(repo::delete(&state.db, user_id, id).await?)
}
