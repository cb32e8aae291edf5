use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::PrimitiveDateTime;

use super::services::{MacroGrams, Ratios};
use crate::coerce;

/// The only `nutrients.kind` that is stored; "current" is always computed.
pub const GOAL_KIND: &str = "goal";

#[derive(Debug, Clone, FromRow)]
pub struct GoalRow {
    pub veg: f64,
    pub carb: f64,
    pub protein: f64,
    pub updated_at: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HistoryEntry {
    pub id: i64,
    pub user_id: i64,
    #[serde(serialize_with = "coerce::timestamp::serialize")]
    pub eaten_at: PrimitiveDateTime,
    pub food_id: Option<i64>,
    pub name: Option<String>,
    pub veg_g: f64,
    pub carb_g: f64,
    pub protein_g: f64,
    pub amount_g: Option<f64>,
    pub note: Option<String>,
}

pub struct NewHistory {
    pub eaten_at: Option<PrimitiveDateTime>,
    pub food_id: Option<i64>,
    pub name: Option<String>,
    pub grams: MacroGrams,
    pub amount_g: Option<f64>,
    pub note: Option<String>,
}

/// Macro totals eaten in `[from, until)`.
pub async fn sum_between(
    db: &PgPool,
    user_id: i64,
    from: PrimitiveDateTime,
    until: PrimitiveDateTime,
) -> anyhow::Result<MacroGrams> {
    let sums = sqlx::query_as::<_, MacroGrams>(
        r#"
        SELECT
            COALESCE(SUM(veg_g), 0)::float8     AS veg_g,
            COALESCE(SUM(carb_g), 0)::float8    AS carb_g,
            COALESCE(SUM(protein_g), 0)::float8 AS protein_g
        FROM nutrient_history
        WHERE user_id = $1 AND eaten_at >= $2 AND eaten_at < $3
        "#,
    )
    .bind(user_id)
    .bind(from)
    .bind(until)
    .fetch_one(db)
    .await
    .context("sum nutrient history")?;
    Ok(sums)
}

pub async fn find_goal(db: &PgPool, user_id: i64) -> anyhow::Result<Option<GoalRow>> {
    let row = sqlx::query_as::<_, GoalRow>(
        r#"
        SELECT veg, carb, protein, updated_at
        FROM nutrients
        WHERE user_id = $1 AND kind = $2
        "#,
    )
    .bind(user_id)
    .bind(GOAL_KIND)
    .fetch_optional(db)
    .await
    .context("find nutrient goal")?;
    Ok(row)
}

pub async fn upsert_goal(db: &PgPool, user_id: i64, goal: Ratios) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO nutrients (user_id, kind, veg, carb, protein)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id, kind) DO UPDATE
           SET veg = EXCLUDED.veg,
               carb = EXCLUDED.carb,
               protein = EXCLUDED.protein,
               updated_at = timezone('utc', now())
        "#,
    )
    .bind(user_id)
    .bind(GOAL_KIND)
    .bind(goal.veg)
    .bind(goal.carb)
    .bind(goal.protein)
    .execute(db)
    .await
    .context("upsert nutrient goal")?;
    Ok(())
}

/// Newest first; restricted to `[from, until)` when a range is given.
pub async fn list_history(
    db: &PgPool,
    user_id: i64,
    range: Option<(PrimitiveDateTime, PrimitiveDateTime)>,
    limit: i64,
) -> anyhow::Result<Vec<HistoryEntry>> {
    let rows = match range {
        Some((from, until)) => {
            sqlx::query_as::<_, HistoryEntry>(
                r#"
                SELECT id, user_id, eaten_at, food_id, name, veg_g, carb_g, protein_g, amount_g, note
                FROM nutrient_history
                WHERE user_id = $1 AND eaten_at >= $2 AND eaten_at < $3
                ORDER BY eaten_at DESC
                LIMIT $4
                "#,
            )
            .bind(user_id)
            .bind(from)
            .bind(until)
            .bind(limit)
            .fetch_all(db)
            .await
        }
        None => {
            sqlx::query_as::<_, HistoryEntry>(
                r#"
                SELECT id, user_id, eaten_at, food_id, name, veg_g, carb_g, protein_g, amount_g, note
                FROM nutrient_history
                WHERE user_id = $1
                ORDER BY eaten_at DESC
                LIMIT $2
                "#,
            )
            .bind(user_id)
            .bind(limit)
            .fetch_all(db)
            .await
        }
    }
    .context("list nutrient history")?;
    Ok(rows)
}

pub async fn insert_history(db: &PgPool, user_id: i64, h: NewHistory) -> anyhow::Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO nutrient_history
            (user_id, eaten_at, food_id, name, veg_g, carb_g, protein_g, amount_g, note)
        VALUES ($1, COALESCE($2, timezone('utc', now())), $3, $4, $5, $6, $7, $8, $9)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(h.eaten_at)
    .bind(h.food_id)
    .bind(h.name)
    .bind(h.grams.veg_g)
    .bind(h.grams.carb_g)
    .bind(h.grams.protein_g)
    .bind(h.amount_g)
    .bind(h.note)
    .fetch_one(db)
    .await
    .context("insert nutrient history")?;
    Ok(id)
}

pub async fn delete_history(db: &PgPool, user_id: i64, id: i64) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM nutrient_history WHERE user_id = $1 AND id = $2")
        .bind(user_id)
        .bind(id)
        .execute(db)
        .await
        .context("delete nutrient history")?;
    Ok(res.rows_affected())
}
