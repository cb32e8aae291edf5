use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::PrimitiveDateTime;

use crate::coerce;

pub const DEFAULT_PER_UNIT_G: f64 = 100.0;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FoodItem {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub veg_g: f64,
    pub carb_g: f64,
    pub protein_g: f64,
    pub per_unit_g: f64,
    #[serde(serialize_with = "coerce::timestamp::serialize")]
    pub created_at: PrimitiveDateTime,
}

pub struct NewFood<'a> {
    pub name: &'a str,
    pub veg_g: f64,
    pub carb_g: f64,
    pub protein_g: f64,
    pub per_unit_g: f64,
}

/// `%` and `_` in user input match literally.
fn like_pattern(q: &str) -> String {
    let mut out = String::with_capacity(q.len() + 2);
    out.push('%');
    for c in q.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

pub async fn list(db: &PgPool, user_id: i64, search: Option<&str>) -> anyhow::Result<Vec<FoodItem>> {
    let rows = match search {
        Some(q) => {
            sqlx::query_as::<_, FoodItem>(
                r#"
                SELECT id, user_id, name, veg_g, carb_g, protein_g, per_unit_g, created_at
                FROM food_items
                WHERE user_id = $1 AND name ILIKE $2
                ORDER BY name ASC
                "#,
            )
            .bind(user_id)
            .bind(like_pattern(q))
            .fetch_all(db)
            .await
        }
        None => {
            sqlx::query_as::<_, FoodItem>(
                r#"
                SELECT id, user_id, name, veg_g, carb_g, protein_g, per_unit_g, created_at
                FROM food_items
                WHERE user_id = $1
                ORDER BY name ASC
                "#,
            )
            .bind(user_id)
            .fetch_all(db)
            .await
        }
    }
    .context("list food items")?;
    Ok(rows)
}

pub async fn find(db: &PgPool, user_id: i64, id: i64) -> anyhow::Result<Option<FoodItem>> {
    let row = sqlx::query_as::<_, FoodItem>(
        r#"
        SELECT id, user_id, name, veg_g, carb_g, protein_g, per_unit_g, created_at
        FROM food_items
        WHERE user_id = $1 AND id = $2
        "#,
    )
    .bind(user_id)
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find food item")?;
    Ok(row)
}

pub async fn insert(db: &PgPool, user_id: i64, food: NewFood<'_>) -> anyhow::Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO food_items (user_id, name, veg_g, carb_g, protein_g, per_unit_g)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(food.name)
    .bind(food.veg_g)
    .bind(food.carb_g)
    .bind(food.protein_g)
    .bind(food.per_unit_g)
    .fetch_one(db)
    .await
    .context("insert food item")?;
    Ok(id)
}

pub async fn delete(db: &PgPool, user_id: i64, id: i64) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM food_items WHERE user_id = $1 AND id = $2")
        .bind(user_id)
        .bind(id)
        .execute(db)
        .await
        .context("delete food item")?;
    Ok(res.rows_affected())
}
