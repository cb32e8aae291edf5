use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Router,
};
use tracing::instrument;

use super::dto::{CreateTaskRequest, UpdateTaskRequest};
use super::repo::{self, Task};
use crate::{
    auth::extractors::Identity,
    coerce::{parse_date, parse_date_opt},
    envelope::{self, Created, Deleted, Updated},
    error::{AppError, AppResult},
    extract::{Json, Path},
    patch::Patch,
    state::AppState,
};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/:id", put(update_task).delete(delete_task))
}

#[instrument(skip(state))]
pub async fn list_tasks(
    State(state): State<AppState>,
    Identity(user_id): Identity,
) -> AppResult<Json<Vec<Task>>> {
    Ok(Json(repo::list_by_user(&state.db, user_id).await?))
}

#[instrument(skip(state, body))]
pub async fn create_task(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Json(body): Json<CreateTaskRequest>,
) -> AppResult<(StatusCode, Json<Created>)> {
    let title = body.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(AppError::validation("title required"));
    }
    let due_date = parse_date_opt(body.due_date.as_deref(), "due_date")?;
    let id = repo::insert(&state.db, user_id, title, body.urgency.unwrap_or(1), due_date).await?;
    Ok(envelope::created(id))
}

#[instrument(skip(state, body))]
pub async fn update_task(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTaskRequest>,
) -> AppResult<Json<Updated>> {
    let title = match body.title.map(|t| t.trim().to_string()) {
        Some(t) if t.is_empty() => return Err(AppError::validation("title must not be empty")),
        other => other,
    };
    let due_date = body
        .due_date
        .map(|d| d.map(|d| parse_date(&d, "due_date")).transpose())
        .transpose()?;

    let mut patch = Patch::update("tasks");
    patch
        .set("title", title)
        .set("urgency", body.urgency)
        .set("due_date", due_date)
        .set("done", body.done);
    if patch.is_empty() {
        return Err(AppError::validation("no fields to update"));
    }

    envelope::updated(patch.execute(&state.db, user_id, id).await?)
}

#[instrument(skip(state))]
pub async fn delete_task(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(id): Path<i64>,
) -> AppResult<Json<Deleted>> {
    envelope::deleted(repo::delete(&state.db, user_id, id).await?)
}
