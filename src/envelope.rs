//! Small success bodies shared by the CRUD routes.

use axum::http::StatusCode;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::Json;

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct Updated {
    pub updated: u64,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: u64,
}

/// `{"ok": true}`
#[derive(Debug, Serialize)]
pub struct Ack {
    pub ok: bool,
}

pub fn ack() -> Json<Ack> {
    Json(Ack { ok: true })
}

pub fn created(id: i64) -> (StatusCode, Json<Created>) {
    (StatusCode::CREATED, Json(Created { id }))
}

/// Zero affected rows means the id does not exist or belongs to someone else.
pub fn updated(count: u64) -> AppResult<Json<Updated>> {
    if count == 0 {
        return Err(AppError::not_found());
    }
    Ok(Json(Updated { updated: count }))
}

pub fn deleted(count: u64) -> AppResult<Json<Deleted>> {
    if count == 0 {
        return Err(AppError::not_found());
    }
    Ok(Json(Deleted { deleted: count }))
}
