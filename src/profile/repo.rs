use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::coerce;

/// Public view of a profile row; the password hash is never selected.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Profile {
    pub user_id: i64,
    pub display_name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    #[serde(serialize_with = "coerce::timestamp_opt::serialize")]
    pub updated_at: Option<PrimitiveDateTime>,
}

impl Profile {
    /// What `GET /profile` shows before the user has saved anything.
    pub fn placeholder(user_id: i64) -> Self {
        Self {
            user_id,
            display_name: "Your Name".into(),
            email: Some("you@example.com".into()),
            avatar_url: None,
            bio: Some(String::new()),
            updated_at: None,
        }
    }

    pub async fn find(db: &PgPool, user_id: i64) -> anyhow::Result<Option<Profile>> {
        let row = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id AS user_id, display_name, email, avatar_url, bio, updated_at
            FROM profile
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("find profile")?;
        Ok(row)
    }
}

/// Fields a caller may change on their own profile.
#[derive(Debug, Default)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub email: Option<Option<String>>,
    pub avatar_url: Option<Option<String>>,
    pub bio: Option<String>,
}

impl ProfilePatch {
    fn columns(&self) -> Vec<&'static str> {
        let mut cols = Vec::with_capacity(4);
        if self.display_name.is_some() {
            cols.push("display_name");
        }
        if self.email.is_some() {
            cols.push("email");
        }
        if self.avatar_url.is_some() {
            cols.push("avatar_url");
        }
        if self.bio.is_some() {
            cols.push("bio");
        }
        cols
    }

    pub fn is_empty(&self) -> bool {
        self.columns().is_empty()
    }

    /// Single-statement upsert: a fresh row takes the provided values (or
    /// defaults), an existing row only has the provided columns replaced.
    fn into_upsert(self, user_id: i64) -> QueryBuilder<'static, Postgres> {
        let columns = self.columns();
        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO profile (id, display_name, email, avatar_url, bio) VALUES (",
        );
        {
            let mut values = qb.separated(", ");
            values.push_bind(user_id);
            values.push_bind(self.display_name.unwrap_or_else(|| "User".into()));
            values.push_bind(self.email.flatten());
            values.push_bind(self.avatar_url.flatten());
            values.push_bind(self.bio.unwrap_or_default());
        }
        qb.push(") ON CONFLICT (id) DO UPDATE SET ");
        for col in columns {
            qb.push(col).push(" = EXCLUDED.").push(col).push(", ");
        }
        qb.push("updated_at = timezone('utc', now())");
        qb
    }

    pub async fn apply(self, db: &PgPool, user_id: i64) -> anyhow::Result<()> {
        let mut qb = self.into_upsert(user_id);
        qb.build()
            .execute(db)
            .await
            .context("upsert profile")?;
        Ok(())
    }
}
