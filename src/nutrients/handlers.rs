use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Router,
};
use tracing::{info, instrument};

use super::dto::{
    CreateHistoryRequest, DayQuery, GoalView, HistoryQuery, LegacyPutRequest, NutrientsResponse,
    RatiosInput, UpdateHistoryRequest,
};
use super::repo::{self, HistoryEntry, NewHistory, GOAL_KIND};
use super::services::{self, MacroGrams, Ratios, DEFAULT_GOAL};
use crate::{
    auth::extractors::Identity,
    coerce::{day_bounds, parse_date_opt, parse_timestamp, parse_timestamp_opt, today_utc},
    envelope::{self, ack, Ack, Created, Deleted, Updated},
    error::{AppError, AppResult},
    extract::{Json, Path, Query},
    foods,
    patch::Patch,
    state::AppState,
};

const DEFAULT_HISTORY_LIMIT: i64 = 20;
const MAX_HISTORY_LIMIT: i64 = 500;
const DEFAULT_AMOUNT_G: f64 = 100.0;

pub fn nutrient_routes() -> Router<AppState> {
    Router::new()
        .route("/nutrients", get(get_nutrients).put(put_nutrients_legacy))
        .route("/nutrients/:kind", put(put_nutrients_kind))
}

pub fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/nutrients/history", get(list_history).post(create_history))
        .route(
            "/nutrients/history/:id",
            put(update_history).delete(delete_history),
        )
}

#[instrument(skip(state))]
pub async fn get_nutrients(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Query(q): Query<DayQuery>,
) -> AppResult<Json<NutrientsResponse>> {
    let day = parse_date_opt(q.date.as_deref(), "date")?.unwrap_or_else(today_utc);
    let (from, until) = day_bounds(day);

    let sums = repo::sum_between(&state.db, user_id, from, until).await?;
    let current = services::current(sums, day);

    let goal = match repo::find_goal(&state.db, user_id).await? {
        Some(row) => GoalView {
            ratios: Ratios {
                veg: row.veg,
                carb: row.carb,
                protein: row.protein,
            },
            updated_at: row.updated_at,
        },
        None => GoalView {
            ratios: DEFAULT_GOAL,
            updated_at: None,
        },
    };

    Ok(Json(NutrientsResponse { current, goal }))
}

async fn write_goal(state: &AppState, user_id: i64, input: RatiosInput) -> AppResult<Json<Ack>> {
    let goal = Ratios::from(input);
    repo::upsert_goal(&state.db, user_id, goal).await?;
    info!(user_id, ?goal, "nutrient goal saved");
    Ok(ack())
}

#[instrument(skip(state, body))]
pub async fn put_nutrients_legacy(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Json(body): Json<LegacyPutRequest>,
) -> AppResult<Json<Ack>> {
    let Some(goal) = body.into_goal() else {
        return Err(AppError::validation("only 'goal' is editable now"));
    };
    write_goal(&state, user_id, goal).await
}

#[instrument(skip(state, body))]
pub async fn put_nutrients_kind(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(kind): Path<String>,
    Json(body): Json<RatiosInput>,
) -> AppResult<Json<Ack>> {
    if !kind.eq_ignore_ascii_case(GOAL_KIND) {
        return Err(AppError::validation(
            "current is computed from history; only 'goal' is editable",
        ));
    }
    write_goal(&state, user_id, body).await
}

#[instrument(skip(state))]
pub async fn list_history(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Query(q): Query<HistoryQuery>,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    let limit = q
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    let range = parse_date_opt(q.date.as_deref(), "date")?.map(day_bounds);
    Ok(Json(repo::list_history(&state.db, user_id, range, limit).await?))
}

#[instrument(skip(state, body))]
pub async fn create_history(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Json(body): Json<CreateHistoryRequest>,
) -> AppResult<(StatusCode, Json<Created>)> {
    let eaten_at = parse_timestamp_opt(body.eaten_at.as_deref(), "eaten_at")?;
    if matches!(body.amount_g, Some(a) if a < 0.0) {
        return Err(AppError::validation("amount_g must not be negative"));
    }

    let entry = match body.food_id.filter(|id| *id != 0) {
        Some(food_id) => {
            let amount_g = body.amount_g.unwrap_or(DEFAULT_AMOUNT_G);
            let food = foods::repo::find(&state.db, user_id, food_id)
                .await?
                .ok_or_else(|| AppError::NotFound("food not found".into()))?;
            NewHistory {
                eaten_at,
                food_id: Some(food_id),
                grams: services::scale(&food, amount_g),
                name: Some(food.name),
                amount_g: Some(amount_g),
                note: body.note,
            }
        }
        None => NewHistory {
            eaten_at,
            food_id: None,
            name: body
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            grams: MacroGrams {
                veg_g: body.veg_g.unwrap_or(0.0),
                carb_g: body.carb_g.unwrap_or(0.0),
                protein_g: body.protein_g.unwrap_or(0.0),
            },
            amount_g: body.amount_g,
            note: body.note,
        },
    };

    let id = repo::insert_history(&state.db, user_id, entry).await?;
    Ok(envelope::created(id))
}

#[instrument(skip(state, body))]
pub async fn update_history(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(id): Path<i64>,
    Json(body): Json<UpdateHistoryRequest>,
) -> AppResult<Json<Updated>> {
    let eaten_at = body
        .eaten_at
        .as_deref()
        .map(|raw| parse_timestamp(raw, "eaten_at"))
        .transpose()?;

    let mut patch = Patch::update("nutrient_history");
    patch
        .set("name", body.name)
        .set("veg_g", body.veg_g)
        .set("carb_g", body.carb_g)
        .set("protein_g", body.protein_g)
        .set("amount_g", body.amount_g)
        .set("note", body.note)
        .set("eaten_at", eaten_at);
    if patch.is_empty() {
        return Err(AppError::validation("no fields to update"));
    }

    envelope::updated(patch.execute(&state.db, user_id, id).await?)
}

#[instrument(skip(state))]
pub async fn delete_history(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(id): Path<i64>,
) -> AppResult<Json<Deleted>> {
    envelope::deleted(repo::delete_history(&state.db, user_id, id).await?)
}
