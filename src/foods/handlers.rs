use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Router,
};
use tracing::instrument;

use super::dto::{CreateFoodRequest, SearchQuery, UpdateFoodRequest};
use super::repo::{self, FoodItem, NewFood, DEFAULT_PER_UNIT_G};
use crate::{
    auth::extractors::Identity,
    envelope::{self, Created, Deleted, Updated},
    error::{AppError, AppResult},
    extract::{Json, Path, Query},
    patch::Patch,
    state::AppState,
};

pub fn food_routes() -> Router<AppState> {
    Router::new()
        .route("/foods", get(list_foods).post(create_food))
        .route("/foods/:id", put(update_food).delete(delete_food))
}

/// Scaling a food by amount divides by `per_unit_g`, so it must be positive.
fn check_per_unit(per_unit_g: f64) -> AppResult<f64> {
    if per_unit_g > 0.0 {
        Ok(per_unit_g)
    } else {
        Err(AppError::validation("per_unit_g must be greater than 0"))
    }
}

#[instrument(skip(state))]
pub async fn list_foods(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Query(q): Query<SearchQuery>,
) -> AppResult<Json<Vec<FoodItem>>> {
    let search = q.q.as_deref().map(str::trim).filter(|s| !s.is_empty());
    Ok(Json(repo::list(&state.db, user_id, search).await?))
}

#[instrument(skip(state, body))]
pub async fn create_food(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Json(body): Json<CreateFoodRequest>,
) -> AppResult<(StatusCode, Json<Created>)> {
    let name = body.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(AppError::validation("name required"));
    }
    let per_unit_g = check_per_unit(body.per_unit_g.unwrap_or(DEFAULT_PER_UNIT_G))?;

    let id = repo::insert(
        &state.db,
        user_id,
        NewFood {
            name,
            veg_g: body.veg_g.unwrap_or(0.0),
            carb_g: body.carb_g.unwrap_or(0.0),
            protein_g: body.protein_g.unwrap_or(0.0),
            per_unit_g,
        },
    )
    .await?;
    Ok(envelope::created(id))
}

#[instrument(skip(state, body))]
pub async fn update_food(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(id): Path<i64>,
    Json(body): Json<UpdateFoodRequest>,
) -> AppResult<Json<Updated>> {
    let name = match body.name.map(|n| n.trim().to_string()) {
        Some(n) if n.is_empty() => return Err(AppError::validation("name must not be empty")),
        other => other,
    };
    let per_unit_g = body.per_unit_g.map(check_per_unit).transpose()?;

    let mut patch = Patch::update("food_items");
    patch
        .set("name", name)
        .set("veg_g", body.veg_g)
        .set("carb_g", body.carb_g)
        .set("protein_g", body.protein_g)
        .set("per_unit_g", per_unit_g);
    if patch.is_empty() {
        return Err(AppError::validation("no fields"));
    }

    envelope::updated(patch.execute(&state.db, user_id, id).await?)
}

#[instrument(skip(state))]
pub async fn delete_food(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Path(id): Path<i64>,
) -> AppResult<Json<Deleted>> {
    envelope::deleted(repo::delete(&state.db, user_id, id).await?)
}
