use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::PrimitiveDateTime;

use crate::coerce;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CalendarEvent {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub note: Option<String>,
    #[serde(serialize_with = "coerce::timestamp::serialize")]
    pub starts_at: PrimitiveDateTime,
    #[serde(serialize_with = "coerce::timestamp_opt::serialize")]
    pub ends_at: Option<PrimitiveDateTime>,
    pub all_day: bool,
    pub color: Option<String>,
    #[serde(serialize_with = "coerce::timestamp::serialize")]
    pub created_at: PrimitiveDateTime,
}

pub struct NewEvent<'a> {
    pub title: &'a str,
    pub note: Option<&'a str>,
    pub starts_at: PrimitiveDateTime,
    pub ends_at: Option<PrimitiveDateTime>,
    pub all_day: bool,
    pub color: Option<&'a str>,
}

/// Events that start at or after `from` and finish before `until`. An event
/// without an end is treated as ending when it starts.
pub async fn list_in_range(
    db: &PgPool,
    user_id: i64,
    from: PrimitiveDateTime,
    until: PrimitiveDateTime,
) -> anyhow::Result<Vec<CalendarEvent>> {
    let rows = sqlx::query_as::<_, CalendarEvent>(
        r#"
        SELECT id, user_id, title, note, starts_at, ends_at, all_day, color, created_at
        FROM calendar_events
        WHERE user_id = $1
          AND starts_at >= $2
          AND COALESCE(ends_at, starts_at) < $3
        ORDER BY starts_at ASC
        "#,
    )
    .bind(user_id)
    .bind(from)
    .bind(until)
    .fetch_all(db)
    .await
    .context("list calendar events")?;
    Ok(rows)
}

pub async fn insert(db: &PgPool, user_id: i64, ev: NewEvent<'_>) -> anyhow::Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO calendar_events (user_id, title, note, starts_at, ends_at, all_day, color)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(ev.title)
    .bind(ev.note)
    .bind(ev.starts_at)
    .bind(ev.ends_at)
    .bind(ev.all_day)
    .bind(ev.color)
    .fetch_one(db)
    .await
    .context("insert calendar event")?;
    Ok(id)
}

pub async fn delete(db: &PgPool, user_id: i64, id: i64) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM calendar_events WHERE user_id = $1 AND id = $2")
        .bind(user_id)
        .bind(id)
        .execute(db)
        .await
        .context("delete calendar event")?;
    Ok(res.rows_affected())
}
