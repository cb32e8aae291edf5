use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Goal {
    pub user_id: i64,
    pub progress: f64,
}

pub async fn find(db: &PgPool, user_id: i64) -> anyhow::Result<Option<Goal>> {
    let row = sqlx::query_as::<_, Goal>("SELECT user_id, progress FROM goals WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("find goal")?;
    Ok(row)
}

pub async fn upsert(db: &PgPool, user_id: i64, progress: f64) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO goals (user_id, progress)
        VALUES ($1, $2)
        ON CONFLICT (user_id) DO UPDATE SET progress = EXCLUDED.progress
        "#,
    )
    .bind(user_id)
    .bind(progress)
    .execute(db)
    .await
    .context("upsert goal")?;
    Ok(())
}
