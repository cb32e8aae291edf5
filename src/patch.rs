//! Partial updates over a fixed column whitelist.
//!
//! Column names are `&'static str` chosen by the caller at compile time and
//! every value goes through `push_bind`, so request input never reaches the
//! SQL text.

use anyhow::Context;
use serde::{Deserialize, Deserializer};
use sqlx::{Encode, PgPool, Postgres, QueryBuilder, Type};

pub struct Patch<'a> {
    table: &'static str,
    qb: QueryBuilder<'a, Postgres>,
    fields: usize,
}

impl<'a> Patch<'a> {
    pub fn update(table: &'static str) -> Self {
        let mut qb = QueryBuilder::new("UPDATE ");
        qb.push(table).push(" SET ");
        Self { table, qb, fields: 0 }
    }

    /// Adds `column = $n` when `value` is present. For nullable columns pass
    /// an `Option<Option<T>>` so that `Some(None)` writes NULL.
    pub fn set<T>(&mut self, column: &'static str, value: Option<T>) -> &mut Self
    where
        T: 'a + Encode<'a, Postgres> + Type<Postgres> + Send,
    {
        if let Some(v) = value {
            if self.fields > 0 {
                self.qb.push(", ");
            }
            self.qb.push(column).push(" = ").push_bind(v);
            self.fields += 1;
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields == 0
    }

    fn scope(&mut self, user_id: i64, id: i64) {
        self.qb
            .push(" WHERE user_id = ")
            .push_bind(user_id)
            .push(" AND id = ")
            .push_bind(id);
    }

    /// Runs the update against the row `id` owned by `user_id` and returns
    /// the number of rows it touched.
    pub async fn execute(mut self, db: &PgPool, user_id: i64, id: i64) -> anyhow::Result<u64> {
        debug_assert!(!self.is_empty(), "empty patch for {}", self.table);
        self.scope(user_id, id);
        let table = self.table;
        let res = self
            .qb
            .build()
            .execute(db)
            .await
            .with_context(|| format!("update {table}"))?;
        Ok(res.rows_affected())
    }
}

/// Deserializes a field that may be absent, `null`, or a value into
/// `None`, `Some(None)` and `Some(Some(v))` respectively. Use together with
/// `#[serde(default)]`.
pub fn nullable<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
