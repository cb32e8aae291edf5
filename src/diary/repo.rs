use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::{Date, PrimitiveDateTime};

use crate::coerce;

/// Entries returned when no day is requested.
const RECENT_LIMIT: i64 = 50;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DiaryEntry {
    pub id: i64,
    pub user_id: i64,
    #[serde(serialize_with = "coerce::date::serialize")]
    pub entry_date: Date,
    pub title: String,
    pub content: String,
    pub mood: Option<String>,
    #[serde(serialize_with = "coerce::timestamp::serialize")]
    pub created_at: PrimitiveDateTime,
    #[serde(serialize_with = "coerce::timestamp::serialize")]
    pub updated_at: PrimitiveDateTime,
}

pub struct NewEntry<'a> {
    pub entry_date: Date,
    pub title: &'a str,
    pub content: &'a str,
    pub mood: Option<&'a str>,
}

pub async fn list_for_day(db: &PgPool, user_id: i64, day: Date) -> anyhow::Result<Vec<DiaryEntry>> {
    let rows = sqlx::query_as::<_, DiaryEntry>(
        r#"
        SELECT id, user_id, entry_date, title, content, mood, created_at, updated_at
        FROM diary_entries
        WHERE user_id = $1 AND entry_date = $2
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(day)
    .fetch_all(db)
    .await
    .context("list diary entries for day")?;
    Ok(rows)
}

pub async fn list_recent(db: &PgPool, user_id: i64) -> anyhow::Result<Vec<DiaryEntry>> {
    let rows = sqlx::query_as::<_, DiaryEntry>(
        r#"
        SELECT id, user_id, entry_date, title, content, mood, created_at, updated_at
        FROM diary_entries
        WHERE user_id = $1
        ORDER BY entry_date DESC, created_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(RECENT_LIMIT)
    .fetch_all(db)
    .await
    .context("list recent diary entries")?;
    Ok(rows)
}

pub async fn insert(db: &PgPool, user_id: i64, entry: NewEntry<'_>) -> anyhow::Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO diary_entries (user_id, entry_date, title, content, mood)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(entry.entry_date)
    .bind(entry.title)
    .bind(entry.content)
    .bind(entry.mood)
    .fetch_one(db)
    .await
    .context("insert diary entry")?;
    Ok(id)
}

pub async fn delete(db: &PgPool, user_id: i64, id: i64) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM diary_entries WHERE user_id = $1 AND id = $2")
        .bind(user_id)
        .bind(id)
        .execute(db)
        .await
        .context("delete diary entry")?;
    Ok(res.rows_affected())
}
