//! Company membership repository
//!
//! Assignment rules:
//! - only Approved registrants can be assigned
//! - a registrant is in at most one company (PK on `company_members.fsy_id`)
//! - the group must belong to the company (composite foreign key)

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::{conflict_on_unique, DbError};
use crate::models::{RegistrationStatus, SearchTerm};

/// Counselors sort ahead of participants in every member listing.
const TYPE_ORDER: &str = r#"
    CASE
        WHEN r.participant_type = 'Counselor' THEN 1
        WHEN r.participant_type = 'Participant' THEN 2
        ELSE 3
    END
"#;

/// Member of a company, as listed on the company page
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MemberRow {
    pub fsy_id: i64,
    pub full_name: String,
    pub gender: Option<String>,
    pub status: String,
    pub participant_type: String,
    pub stake_name: Option<String>,
    pub unit_name: Option<String>,
    pub company_name: String,
    pub group_name: String,
}

/// A registrant's current assignment
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MemberAssignment {
    pub fsy_id: i64,
    pub company_id: i32,
    pub group_id: i32,
    pub joined_at: DateTime<Utc>,
    pub company_name: String,
    pub company_number: Option<i32>,
    pub group_name: String,
    pub group_number: Option<i32>,
}

/// Search hit; company/group are absent for unassigned registrants
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MemberSearchRow {
    pub fsy_id: i64,
    pub full_name: String,
    pub gender: Option<String>,
    pub status: String,
    pub participant_type: String,
    pub stake_name: Option<String>,
    pub unit_name: Option<String>,
    pub company_name: Option<String>,
    pub group_name: Option<String>,
}

/// Row of the members CSV export
#[derive(Debug, Clone, FromRow)]
pub struct MemberExportRow {
    pub fsy_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub stake_name: Option<String>,
    pub participant_type: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub group_name: String,
    pub company_name: String,
    pub joined_at: DateTime<Utc>,
}

/// Membership repository
pub struct MemberRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> MemberRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Members of a company, optionally restricted to one group.
    pub async fn list(
        &self,
        company_id: i32,
        group_id: Option<i32>,
    ) -> Result<Vec<MemberRow>, DbError> {
        let rows = sqlx::query_as(&format!(
            r#"
            SELECT
                r.fsy_id,
                CONCAT(r.first_name, ' ', r.last_name) AS full_name,
                r.gender,
                r.status,
                r.participant_type,
                r.stake_name,
                r.unit_name,
                c.company_name,
                cg.group_name
            FROM company_members cm
            JOIN registrations r ON cm.fsy_id = r.fsy_id
            JOIN companies c ON cm.company_id = c.company_id
            JOIN companies_groups cg ON cm.group_id = cg.group_id
            WHERE cm.company_id = $1
                AND ($2::INT IS NULL OR cm.group_id = $2)
            ORDER BY {TYPE_ORDER}, r.first_name, r.last_name
            "#
        ))
        .bind(company_id)
        .bind(group_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Whether `group_id` is one of `company_id`'s groups.
    async fn group_in_company(&self, company_id: i32, group_id: i32) -> Result<bool, DbError> {
        let (found,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM companies_groups WHERE company_id = $1 AND group_id = $2)",
        )
        .bind(company_id)
        .bind(group_id)
        .fetch_one(self.pool)
        .await?;
        Ok(found)
    }

    /// Assign an approved registrant to a company group.
    pub async fn add(&self, fsy_id: i64, company_id: i32, group_id: i32) -> Result<(), DbError> {
        let status: Option<(String,)> =
            sqlx::query_as("SELECT status FROM registrations WHERE fsy_id = $1")
                .bind(fsy_id)
                .fetch_optional(self.pool)
                .await?;

        match status {
            None => return Err(DbError::not_found("member", fsy_id)),
            Some((status,)) if status != RegistrationStatus::Approved.as_str() => {
                return Err(DbError::Rejected {
                    message: "Only approved members can be added to a company",
                });
            }
            Some(_) => {}
        }

        let assigned: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM company_members WHERE fsy_id = $1)")
                .bind(fsy_id)
                .fetch_one(self.pool)
                .await?;
        if assigned {
            return Err(DbError::Conflict {
                message: "Member is already assigned to a company".into(),
            });
        }

        if !self.group_in_company(company_id, group_id).await? {
            return Err(DbError::Rejected {
                message: "Invalid group for the selected company",
            });
        }

        sqlx::query("INSERT INTO company_members (company_id, fsy_id, group_id) VALUES ($1, $2, $3)")
            .bind(company_id)
            .bind(fsy_id)
            .bind(group_id)
            .execute(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "Member is already assigned to a company"))?;

        tracing::info!(fsy_id, company_id, group_id, "member assigned");
        Ok(())
    }

    pub async fn get(&self, fsy_id: i64) -> Result<MemberAssignment, DbError> {
        sqlx::query_as(
            r#"
            SELECT
                cm.fsy_id,
                cm.company_id,
                cm.group_id,
                cm.joined_at,
                c.company_name,
                c.company_number,
                cg.group_name,
                cg.group_number
            FROM company_members cm
            JOIN companies c ON cm.company_id = c.company_id
            JOIN companies_groups cg ON cm.group_id = cg.group_id
            WHERE cm.fsy_id = $1
            "#,
        )
        .bind(fsy_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("company member", fsy_id))
    }

    /// Move an assigned member to another company/group.
    pub async fn reassign(
        &self,
        fsy_id: i64,
        company_id: i32,
        group_id: i32,
    ) -> Result<MemberAssignment, DbError> {
        if !self.group_in_company(company_id, group_id).await? {
            return Err(DbError::Rejected {
                message: "Invalid group for the selected company",
            });
        }

        let result = sqlx::query(
            "UPDATE company_members SET company_id = $2, group_id = $3 WHERE fsy_id = $1",
        )
        .bind(fsy_id)
        .bind(company_id)
        .bind(group_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("company member", fsy_id));
        }

        tracing::info!(fsy_id, company_id, group_id, "member reassigned");
        self.get(fsy_id).await
    }

    pub async fn remove(&self, fsy_id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM company_members WHERE fsy_id = $1")
            .bind(fsy_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("company member", fsy_id));
        }
        tracing::info!(fsy_id, "member removed");
        Ok(())
    }

    /// Approved registrants matching the term, with their assignment if any.
    pub async fn search(&self, term: &SearchTerm) -> Result<Vec<MemberSearchRow>, DbError> {
        let rows = sqlx::query_as(&format!(
            r#"
            SELECT
                r.fsy_id,
                CONCAT(r.first_name, ' ', r.last_name) AS full_name,
                r.gender,
                r.status,
                r.participant_type,
                r.stake_name,
                r.unit_name,
                c.company_name,
                cg.group_name
            FROM registrations r
            LEFT JOIN company_members cm ON r.fsy_id = cm.fsy_id
            LEFT JOIN companies c ON cm.company_id = c.company_id
            LEFT JOIN companies_groups cg ON cm.group_id = cg.group_id
            WHERE r.status = $2
                AND (
                    r.fsy_id::TEXT LIKE $1
                    OR CONCAT(r.first_name, ' ', r.last_name) ILIKE $1
                    OR r.stake_name ILIKE $1
                    OR r.unit_name ILIKE $1
                )
            ORDER BY {TYPE_ORDER}, r.first_name, r.last_name
            LIMIT 50
            "#
        ))
        .bind(term.like_pattern())
        .bind(RegistrationStatus::Approved.as_str())
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Every assignment, ordered for the CSV export.
    pub async fn export_rows(&self) -> Result<Vec<MemberExportRow>, DbError> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                r.fsy_id,
                r.first_name,
                r.last_name,
                r.stake_name,
                r.participant_type,
                r.phone_number,
                r.email,
                cg.group_name,
                c.company_name,
                cm.joined_at
            FROM company_members cm
            JOIN registrations r ON cm.fsy_id = r.fsy_id
            JOIN companies_groups cg ON cm.group_id = cg.group_id
            JOIN companies c ON cm.company_id = c.company_id
            ORDER BY c.company_name, cg.group_name, r.first_name, r.last_name
            "#,
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
