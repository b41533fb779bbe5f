//! Stake and unit lookups for filter dropdowns

use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::DbError;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Stake {
    pub stake_name: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Unit {
    pub unit_name: String,
}

pub struct ReferenceRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ReferenceRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn stakes(&self) -> Result<Vec<Stake>, DbError> {
        let rows = sqlx::query_as("SELECT stake_name FROM stakes ORDER BY stake_name")
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Units of one stake. An unknown stake yields an empty list.
    pub async fn units(&self, stake_name: &str) -> Result<Vec<Unit>, DbError> {
        let rows = sqlx::query_as(
            "SELECT unit_name FROM units WHERE stake_name = $1 ORDER BY unit_name",
        )
        .bind(stake_name)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
