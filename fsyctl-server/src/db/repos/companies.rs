//! Company repository
//!
//! - create: company + groups in one transaction, duplicate names via the
//!   UNIQUE constraint (no check-then-insert)
//! - list: LEFT JOINs for group/member counts (no N+1)

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::groups::{self, Group};
use super::{conflict_on_unique, DbError};
use crate::models::{CompanyName, GroupName};

const DUPLICATE_NAME: &str = "A company with this name already exists";

/// Company record from database
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Company {
    pub company_id: i32,
    pub company_number: Option<i32>,
    pub company_name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Company with group and member counts for list display
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CompanyWithCounts {
    pub company_id: i32,
    pub company_number: Option<i32>,
    pub company_name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub group_count: i64,
    pub member_count: i64,
}

/// Company with its groups
#[derive(Debug, Clone, Serialize)]
pub struct CompanyWithGroups {
    #[serde(flatten)]
    pub company: Company,
    pub groups: Vec<Group>,
}

/// Group to create alongside a company
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub number: Option<i32>,
    pub name: GroupName,
}

/// Blank descriptions are stored as NULL.
fn clean_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_owned)
}

/// Company repository
pub struct CompanyRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CompanyRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<CompanyWithCounts>, DbError> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                c.company_id,
                c.company_number,
                c.company_name,
                c.description,
                c.created_at,
                COUNT(DISTINCT cg.group_id) AS group_count,
                COUNT(DISTINCT cm.fsy_id) AS member_count
            FROM companies c
            LEFT JOIN companies_groups cg ON c.company_id = cg.company_id
            LEFT JOIN company_members cm ON c.company_id = cm.company_id
            GROUP BY c.company_id, c.company_number, c.company_name, c.description, c.created_at
            ORDER BY c.company_number, c.company_name ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Create a company and its initial groups atomically.
    pub async fn create(
        &self,
        name: &CompanyName,
        number: Option<i32>,
        description: Option<&str>,
        new_groups: &[NewGroup],
    ) -> Result<CompanyWithGroups, DbError> {
        let mut tx = self.pool.begin().await?;

        let company: Company = sqlx::query_as(
            r#"
            INSERT INTO companies (company_name, company_number, description)
            VALUES ($1, $2, $3)
            RETURNING company_id, company_number, company_name, description, created_at
            "#,
        )
        .bind(name.as_str())
        .bind(number)
        .bind(clean_description(description))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_NAME))?;

        for group in new_groups {
            sqlx::query(
                r#"
                INSERT INTO companies_groups (company_id, group_number, group_name)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(company.company_id)
            .bind(group.number)
            .bind(group.name.as_str())
            .execute(&mut *tx)
            .await?;
        }

        let groups = groups::fetch_for_company(&mut *tx, company.company_id).await?;
        tx.commit().await?;

        tracing::info!(
            company_id = company.company_id,
            groups = groups.len(),
            "company created"
        );
        Ok(CompanyWithGroups { company, groups })
    }

    /// Next free company number (highest + 1, starting at 1).
    pub async fn next_number(&self) -> Result<i32, DbError> {
        let (next,): (i32,) =
            sqlx::query_as("SELECT COALESCE(MAX(company_number), 0) + 1 FROM companies")
                .fetch_one(self.pool)
                .await?;
        Ok(next)
    }

    pub async fn get(&self, company_id: i32) -> Result<CompanyWithGroups, DbError> {
        let company: Company = sqlx::query_as(
            r#"
            SELECT company_id, company_number, company_name, description, created_at
            FROM companies
            WHERE company_id = $1
            "#,
        )
        .bind(company_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("company", company_id))?;

        let groups = groups::fetch_for_company(self.pool, company_id).await?;
        Ok(CompanyWithGroups { company, groups })
    }

    pub async fn update(
        &self,
        company_id: i32,
        name: &CompanyName,
        number: Option<i32>,
        description: Option<&str>,
    ) -> Result<Company, DbError> {
        sqlx::query_as(
            r#"
            UPDATE companies
            SET company_name = $2, company_number = $3, description = $4
            WHERE company_id = $1
            RETURNING company_id, company_number, company_name, description, created_at
            "#,
        )
        .bind(company_id)
        .bind(name.as_str())
        .bind(number)
        .bind(clean_description(description))
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_NAME))?
        .ok_or_else(|| DbError::not_found("company", company_id))
    }

    /// Delete a company. Groups and memberships go with it.
    pub async fn delete(&self, company_id: i32) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM companies WHERE company_id = $1")
            .bind(company_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("company", company_id));
        }
        tracing::info!(company_id, "company deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::testing::TestDb;

    #[test]
    fn blank_description_is_null() {
        assert_eq!(clean_description(Some("   ")), None);
        assert_eq!(clean_description(None), None);
        assert_eq!(clean_description(Some(" Blue ")).as_deref(), Some("Blue"));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_with_groups_and_reject_duplicate() {
        let db = TestDb::connect().await;
        let repo = CompanyRepo::new(&db.pool);
        let name = CompanyName::new(&TestDb::unique_name("Company")).unwrap();
        let groups = vec![
            NewGroup { number: Some(2), name: GroupName::new("Beta").unwrap() },
            NewGroup { number: Some(1), name: GroupName::new("Alpha").unwrap() },
        ];

        let created = repo.create(&name, Some(900), Some("desc"), &groups).await.unwrap();
        assert_eq!(created.company.company_name, name.as_str());
        let names: Vec<_> = created.groups.iter().map(|g| g.group_name.as_str()).collect();
        assert_eq!(names, ["Alpha", "Beta"]);

        let err = repo.create(&name, None, None, &[]).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        repo.delete(created.company.company_id).await.unwrap();
        let err = repo.get(created.company.company_id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn next_number_follows_max() {
        let db = TestDb::connect().await;
        let repo = CompanyRepo::new(&db.pool);
        let before = repo.next_number().await.unwrap();
        let name = CompanyName::new(&TestDb::unique_name("Numbered")).unwrap();
        let created = repo.create(&name, Some(before), None, &[]).await.unwrap();

        assert_eq!(repo.next_number().await.unwrap(), before + 1);
        repo.delete(created.company.company_id).await.unwrap();
    }
}
