use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::{Date, PrimitiveDateTime};

use crate::coerce;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub urgency: i32,
    #[serde(serialize_with = "coerce::date_opt::serialize")]
    pub due_date: Option<Date>,
    pub done: bool,
    #[serde(serialize_with = "coerce::timestamp::serialize")]
    pub created_at: PrimitiveDateTime,
}

/// Open tasks first, newest first within each group.
pub async fn list_by_user(db: &PgPool, user_id: i64) -> anyhow::Result<Vec<Task>> {
    let rows = sqlx::query_as::<_, Task>(
        r#"
        SELECT id, user_id, title, urgency, due_date, done, created_at
        FROM tasks
        WHERE user_id = $1
        ORDER BY done ASC, created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list tasks")?;
    Ok(rows)
}

pub async fn insert(
    db: &PgPool,
    user_id: i64,
    title: &str,
    urgency: i32,
    due_date: Option<Date>,
) -> anyhow::Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO tasks (user_id, title, urgency, due_date)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(title)
    .bind(urgency)
    .bind(due_date)
    .fetch_one(db)
    .await
    .context("insert task")?;
    Ok(id)
}

pub async fn delete(db: &PgPool, user_id: i64, id: i64) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM tasks WHERE user_id = $1 AND id = $2")
        .bind(user_id)
        .bind(id)
        .execute(db)
        .await
        .context("delete task")?;
    Ok(res.rows_affected())
}
