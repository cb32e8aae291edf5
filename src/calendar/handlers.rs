use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Router,
};
use tracing::instrument;

use super::dto::{CreateEventRequest, RangeQuery};
use super::repo::{self, CalendarEvent, NewEvent};
use crate::{
    auth::extractors::Identity,
    coerce::{day_bounds, parse_date, parse_timestamp, parse_timestamp_opt},
    envelope::{self, Created, Deleted},
    error::{AppError, AppResult},
    extract::{Json, Path, Query},
    state::AppState,
};

pub fn calendar_routes() -> Router<AppState> {
    Router::new()
        .route("/calendar/events", get(list_events).post(create_event))
        .route("/calendar/events/:id", delete(delete_event))
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[instrument(skip(state))]
pub async fn list_events(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Query(q): Query<RangeQuery>,
) -> AppResult<Json<Vec<CalendarEvent>>> {
    let (Some(start), Some(end)) = (non_blank(&q.start), non_blank(&q.end)) else {
        return Err(AppError::validation("start and end required (YYYY-MM-DD)"));
    };
    let (from, _) = day_bounds(parse_date(start, "start")?);
    let (_, until) = day_bounds(parse_date(end, "end")?);

    Ok(Json(repo::list_in_range(&state.db, user_id, from, until).await?))
}

#[instrument(skip(state, body))]
pub async fn create_event(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Json(body): Json<CreateEventRequest>,
) -> AppResult<(StatusCode, Json<Created>)> {
    let (Some(title), Some(starts_at)) = (non_blank(&body.title), non_blank(&body.starts_at)) else {
        return Err(AppError::validation("title and starts_at required"));
    };
    let starts_at = parse_timestamp(starts_at, "starts_at")?;
    let ends_at = parse_timestamp_opt(body.ends_at.as_deref(), "ends_at")?;
    if matches!(ends_at, Some(end) if end < starts_at) {
        return Err(AppError::validation("ends_at must not be before starts_at"));
    }

    let id = repo::insert(
        &state.db,
        user_id,
        NewEvent {
            title,
            note: body.note.as_deref(),
            starts_at,
            ends_at,
            all_day: body.all_day.unwrap_or(false),
            color: body.color.as_deref(),
        },
    )
    .await?;
    Ok(envelope::created(id))
}

#[instrument(skip(state))]
pub async fn delete_event(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(id): Path<i64>,
) -> AppResult<Json<Deleted>> {
    envelope::deleted(repo::delete(&state.db, user_id, id).await?)
}
