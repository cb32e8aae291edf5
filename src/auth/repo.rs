use anyhow::Context;
use sqlx::{FromRow, PgPool};

/// Just what login needs from a profile row.
#[derive(Debug, Clone, FromRow)]
pub struct Credentials {
    pub id: i64,
    pub password_hash: Option<String>,
}

impl Credentials {
    /// Find the credentials registered for an email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<Credentials>> {
        let row = sqlx::query_as::<_, Credentials>(
            r#"
            SELECT id, password_hash
            FROM profile
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
        .context("find profile by email")?;
        Ok(row)
    }

    /// Create a profile with the next free id.
    ///
    /// The table lock serialises concurrent signups around `max(id)+1`, and a
    /// concurrent duplicate email comes back as `None` instead of an error.
    pub async fn create(
        db: &PgPool,
        email: &str,
        display_name: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<i64>> {
        let mut tx = db.begin().await.context("begin tx")?;

        sqlx::query("LOCK TABLE profile IN EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .context("lock profile table")?;

        let id: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO profile (id, display_name, email, password_hash)
            SELECT COALESCE(MAX(id), 0) + 1, $1, $2, $3 FROM profile
            ON CONFLICT (email) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(display_name)
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&mut *tx)
        .await
        .context("insert profile")?;

        tx.commit().await.context("commit tx")?;
        Ok(id)
    }
}
