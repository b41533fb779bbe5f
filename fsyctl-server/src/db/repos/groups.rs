//! Group repository - groups always belong to one company

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgExecutor, PgPool};

use super::{conflict_on_foreign_key, DbError};
use crate::models::GroupName;

/// Group record from database
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Group {
    pub group_id: i32,
    pub company_id: i32,
    pub group_number: Option<i32>,
    pub group_name: String,
    pub created_at: DateTime<Utc>,
}

pub(crate) async fn fetch_for_company<'e, E>(
    executor: E,
    company_id: i32,
) -> Result<Vec<Group>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as(
        r#"
        SELECT group_id, company_id, group_number, group_name, created_at
        FROM companies_groups
        WHERE company_id = $1
        ORDER BY group_number, group_name ASC
        "#,
    )
    .bind(company_id)
    .fetch_all(executor)
    .await
}

/// Group repository
pub struct GroupRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> GroupRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_company(&self, company_id: i32) -> Result<Vec<Group>, DbError> {
        Ok(fetch_for_company(self.pool, company_id).await?)
    }

    /// Add a group to an existing company.
    pub async fn create(
        &self,
        company_id: i32,
        number: Option<i32>,
        name: &GroupName,
    ) -> Result<Group, DbError> {
        sqlx::query_as(
            r#"
            INSERT INTO companies_groups (company_id, group_number, group_name)
            VALUES ($1, $2, $3)
            RETURNING group_id, company_id, group_number, group_name, created_at
            "#,
        )
        .bind(company_id)
        .bind(number)
        .bind(name.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_foreign_key_violation() => DbError::not_found("company", company_id),
            _ => DbError::Sqlx(e),
        })
    }

    pub async fn update(
        &self,
        company_id: i32,
        group_id: i32,
        number: Option<i32>,
        name: &GroupName,
    ) -> Result<Group, DbError> {
        sqlx::query_as(
            r#"
            UPDATE companies_groups
            SET group_number = $3, group_name = $4
            WHERE company_id = $1 AND group_id = $2
            RETURNING group_id, company_id, group_number, group_name, created_at
            "#,
        )
        .bind(company_id)
        .bind(group_id)
        .bind(number)
        .bind(name.as_str())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("group", group_id))
    }

    /// Delete an empty group. Groups with members are refused by the
    /// members foreign key.
    pub async fn delete(&self, company_id: i32, group_id: i32) -> Result<(), DbError> {
        let result = sqlx::query(
            "DELETE FROM companies_groups WHERE company_id = $1 AND group_id = $2",
        )
        .bind(company_id)
        .bind(group_id)
        .execute(self.pool)
        .await
        .map_err(|e| conflict_on_foreign_key(e, "Group still has members assigned"))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("group", group_id));
        }
        Ok(())
    }
}
