//! Registration lookups: participant/counselor lists, searches, profiles
//!
//! Registrations are imported from the registration system; this service
//! reads them and edits profile fields, it never creates or deletes them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use super::DbError;
use crate::models::profile::FieldValue;
use crate::models::{ParticipantType, ProfileUpdate, RegistrationStatus, SearchTerm};

const SUMMARY_COLUMNS: &str = r#"
    SELECT fsy_id, CONCAT(first_name, ' ', last_name) AS full_name,
        gender, phone_number, email, stake_name, unit_name, status
    FROM registrations
"#;

const AGE_EXPR: &str = "DATE_PART('year', AGE(CURRENT_DATE, r.birth_date))::INT";

/// List row for participant/counselor tables
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RegistrantSummary {
    pub fsy_id: i64,
    pub full_name: String,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub stake_name: Option<String>,
    pub unit_name: Option<String>,
    pub status: String,
}

/// Full registration record for the profile page
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Registration {
    pub fsy_id: i64,
    pub participant_type: String,
    pub first_name: String,
    pub last_name: String,
    pub preferred_name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub age: Option<i32>,
    pub shirt_size: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub father_name: Option<String>,
    pub father_email: Option<String>,
    pub father_phone_number: Option<String>,
    pub mother_name: Option<String>,
    pub mother_email: Option<String>,
    pub mother_phone_number: Option<String>,
    pub stake_name: Option<String>,
    pub unit_name: Option<String>,
    pub bishop_name: Option<String>,
    pub bishop_email: Option<String>,
    pub medical_information: Option<String>,
    pub dietary_information: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Approved registrant not yet placed in a company
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssignableRegistrant {
    pub fsy_id: i64,
    pub full_name: String,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub age: Option<i32>,
    pub status: String,
    pub participant_type: String,
    pub stake_name: Option<String>,
    pub unit_name: Option<String>,
}

/// Registrant row for the per-unit drill-down of the reports
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UnitRegistrant {
    pub fsy_id: i64,
    pub preferred_name: Option<String>,
    pub full_name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub status: String,
}

/// Which field a search term matched on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchType {
    #[serde(rename = "fsy_id")]
    FsyId,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "phone_number")]
    PhoneNumber,
    #[serde(rename = "phone")]
    Phone,
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "text")]
    Text,
}

/// Optional list filters; blank values are ignored
#[derive(Debug, Clone, Default)]
pub struct RegistrantFilter {
    pub search: Option<SearchTerm>,
    pub stake_name: Option<String>,
    pub unit_name: Option<String>,
    pub status: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Registration repository
pub struct RegistrationRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> RegistrationRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List registrants of one type, narrowing by each non-blank filter.
    pub fn list_query(
        kind: ParticipantType,
        filter: &RegistrantFilter,
    ) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(SUMMARY_COLUMNS);
        qb.push(" WHERE participant_type = ");
        qb.push_bind(kind.as_str());

        if let Some(stake) = non_blank(&filter.stake_name) {
            qb.push(" AND stake_name = ");
            qb.push_bind(stake);
        }
        if let Some(unit) = non_blank(&filter.unit_name) {
            qb.push(" AND unit_name = ");
            qb.push_bind(unit);
        }
        if let Some(status) = non_blank(&filter.status) {
            qb.push(" AND status = ");
            qb.push_bind(status);
        }
        if let Some(term) = &filter.search {
            qb.push(" AND (CONCAT(first_name, ' ', last_name) ILIKE ");
            qb.push_bind(term.like_pattern());
            if let Some(id) = term.as_fsy_id() {
                qb.push(" OR fsy_id = ");
                qb.push_bind(id);
            }
            qb.push(")");
        }

        qb.push(" ORDER BY last_name, first_name");
        qb
    }

    pub async fn list(
        &self,
        kind: ParticipantType,
        filter: &RegistrantFilter,
    ) -> Result<Vec<RegistrantSummary>, DbError> {
        let rows = Self::list_query(kind, filter)
            .build_query_as::<RegistrantSummary>()
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Participant search: one exact hit on FSY ID, email or phone wins;
    /// otherwise fall back to a partial name match.
    pub async fn search_participants(
        &self,
        term: &SearchTerm,
    ) -> Result<(Vec<RegistrantSummary>, MatchType), DbError> {
        let exact: Option<RegistrantSummary> = sqlx::query_as(&format!(
            "{SUMMARY_COLUMNS} WHERE participant_type = 'Participant' \
             AND (fsy_id = $1 OR email = $2 OR phone_number = $2) LIMIT 1"
        ))
        .bind(term.as_fsy_id())
        .bind(term.as_str())
        .fetch_optional(self.pool)
        .await?;

        if let Some(row) = exact {
            let match_type = if Some(row.fsy_id) == term.as_fsy_id() {
                MatchType::FsyId
            } else if row.email.as_deref() == Some(term.as_str()) {
                MatchType::Email
            } else {
                MatchType::PhoneNumber
            };
            return Ok((vec![row], match_type));
        }

        let rows = sqlx::query_as(&format!(
            "{SUMMARY_COLUMNS} WHERE participant_type = 'Participant' \
             AND CONCAT(first_name, ' ', last_name) ILIKE $1 \
             ORDER BY last_name, first_name"
        ))
        .bind(term.like_pattern())
        .fetch_all(self.pool)
        .await?;

        Ok((rows, MatchType::Name))
    }

    /// Profile search across all registrant types.
    ///
    /// Numeric terms only ever look at FSY ID.
    pub async fn search_profiles(
        &self,
        term: &SearchTerm,
    ) -> Result<(Vec<RegistrantSummary>, MatchType), DbError> {
        if let Some(id) = term.as_fsy_id() {
            let rows = sqlx::query_as(&format!("{SUMMARY_COLUMNS} WHERE fsy_id = $1 LIMIT 1"))
                .bind(id)
                .fetch_all(self.pool)
                .await?;
            return Ok((rows, MatchType::FsyId));
        }

        let exact: Option<RegistrantSummary> = sqlx::query_as(&format!(
            "{SUMMARY_COLUMNS} WHERE email = $1 OR phone_number = $1 LIMIT 1"
        ))
        .bind(term.as_str())
        .fetch_optional(self.pool)
        .await?;

        if let Some(row) = exact {
            let match_type = if row.email.as_deref() == Some(term.as_str()) {
                MatchType::Email
            } else {
                MatchType::Phone
            };
            return Ok((vec![row], match_type));
        }

        let rows = sqlx::query_as(&format!(
            "{SUMMARY_COLUMNS} WHERE CONCAT(first_name, ' ', last_name) ILIKE $1 \
             ORDER BY last_name, first_name"
        ))
        .bind(term.like_pattern())
        .fetch_all(self.pool)
        .await?;

        Ok((rows, MatchType::Name))
    }

    /// Fetch a full record, optionally requiring a participant type.
    pub async fn get(
        &self,
        fsy_id: i64,
        kind: Option<ParticipantType>,
    ) -> Result<Registration, DbError> {
        let sql = format!(
            r#"
            SELECT r.fsy_id, r.participant_type, r.first_name, r.last_name, r.preferred_name,
                r.gender, r.birth_date, {AGE_EXPR} AS age, r.shirt_size, r.phone_number, r.email,
                r.father_name, r.father_email, r.father_phone_number,
                r.mother_name, r.mother_email, r.mother_phone_number,
                r.stake_name, r.unit_name, r.bishop_name, r.bishop_email,
                r.medical_information, r.dietary_information, r.status, r.created_at
            FROM registrations r
            WHERE r.fsy_id = $1
                AND ($2::TEXT IS NULL OR r.participant_type = $2)
            "#
        );

        sqlx::query_as(&sql)
            .bind(fsy_id)
            .bind(kind.map(|k| k.as_str()))
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| {
                let resource = match kind {
                    Some(ParticipantType::Participant) => "participant",
                    Some(ParticipantType::Counselor) => "counselor",
                    None => "profile",
                };
                DbError::not_found(resource, fsy_id)
            })
    }

    /// Build the UPDATE for a profile edit. Column names come from the
    /// editable-field whitelist; values are always bound.
    pub fn update_query(fsy_id: i64, update: &ProfileUpdate) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("UPDATE registrations SET ");
        for (i, (column, value)) in update.fields().iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(*column);
            qb.push(" = ");
            match value {
                FieldValue::Text(text) => qb.push_bind(text.clone()),
                FieldValue::Date(date) => qb.push_bind(*date),
            };
        }
        qb.push(" WHERE fsy_id = ");
        qb.push_bind(fsy_id);
        qb
    }

    pub async fn update(&self, fsy_id: i64, update: &ProfileUpdate) -> Result<(), DbError> {
        let result = Self::update_query(fsy_id, update)
            .build()
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("profile", fsy_id));
        }
        Ok(())
    }

    /// Approved registrants without a company, for the "add members" picker.
    pub async fn search_unassigned(
        &self,
        term: &SearchTerm,
    ) -> Result<(Vec<AssignableRegistrant>, MatchType), DbError> {
        let select = format!(
            r#"
            SELECT r.fsy_id, CONCAT(r.first_name, ' ', r.last_name) AS full_name,
                r.gender, r.birth_date, {AGE_EXPR} AS age, r.status,
                r.participant_type, r.stake_name, r.unit_name
            FROM registrations r
            LEFT JOIN company_members cm ON r.fsy_id = cm.fsy_id
            WHERE cm.fsy_id IS NULL
                AND r.status = '{approved}'
            "#,
            approved = RegistrationStatus::Approved.as_str()
        );

        if let Some(id) = term.as_fsy_id() {
            let rows = sqlx::query_as(&format!(
                "{select} AND r.fsy_id = $1 ORDER BY r.first_name, r.last_name LIMIT 100"
            ))
            .bind(id)
            .fetch_all(self.pool)
            .await?;
            return Ok((rows, MatchType::FsyId));
        }

        let rows = sqlx::query_as(&format!(
            r#"{select}
                AND (CONCAT(r.first_name, ' ', r.last_name) ILIKE $1
                    OR r.stake_name ILIKE $1
                    OR r.unit_name ILIKE $1)
            ORDER BY r.first_name, r.last_name
            LIMIT 100"#
        ))
        .bind(term.like_pattern())
        .fetch_all(self.pool)
        .await?;

        Ok((rows, MatchType::Text))
    }

    /// Registrants of one type in one unit.
    pub async fn by_unit(
        &self,
        kind: ParticipantType,
        unit_name: &str,
    ) -> Result<Vec<UnitRegistrant>, DbError> {
        let rows = sqlx::query_as(&format!(
            r#"
            SELECT r.fsy_id, r.preferred_name, CONCAT(r.first_name, ' ', r.last_name) AS full_name,
                {AGE_EXPR} AS age, r.gender, r.phone_number, r.email, r.status
            FROM registrations r
            WHERE r.participant_type = $1 AND r.unit_name = $2
            ORDER BY r.last_name, r.first_name
            "#
        ))
        .bind(kind.as_str())
        .bind(unit_name)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Whether a registration of `kind` matches the signup details.
    pub async fn matches_signup(
        &self,
        kind: ParticipantType,
        email: &str,
        phone_number: &str,
        birth_date: NaiveDate,
    ) -> Result<bool, DbError> {
        let (found,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM registrations
                WHERE participant_type = $1
                    AND (email = $2 OR phone_number = $3)
                    AND birth_date = $4
            )
            "#,
        )
        .bind(kind.as_str())
        .bind(email)
        .bind(phone_number)
        .bind(birth_date)
        .fetch_one(self.pool)
        .await?;
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_query_only_filters_non_blank_values() {
        let filter = RegistrantFilter {
            search: None,
            stake_name: Some("Cebu North".into()),
            unit_name: Some("  ".into()),
            status: None,
        };
        let sql = RegistrationRepo::list_query(ParticipantType::Counselor, &filter).into_sql();

        assert!(sql.contains("participant_type = $1"));
        assert!(sql.contains("stake_name = $2"));
        assert!(!sql.contains("unit_name ="));
        assert!(!sql.contains("status ="));
        assert!(sql.ends_with("ORDER BY last_name, first_name"));
    }

    #[test]
    fn list_query_numeric_search_also_matches_id() {
        let filter = RegistrantFilter {
            search: Some(SearchTerm::new(Some("1024")).unwrap()),
            ..Default::default()
        };
        let sql = RegistrationRepo::list_query(ParticipantType::Participant, &filter).into_sql();
        assert!(sql.contains("ILIKE $2 OR fsy_id = $3"));
    }

    #[test]
    fn update_query_binds_every_value() {
        let update = ProfileUpdate::from_json(
            json!({"first_name": "Ana", "birth_date": "2009-01-02"})
                .as_object()
                .unwrap(),
        )
        .unwrap();

        let sql = RegistrationRepo::update_query(77, &update).into_sql();
        assert!(sql.starts_with("UPDATE registrations SET "));
        assert!(sql.contains("birth_date = $"));
        assert!(sql.contains("first_name = $"));
        assert!(sql.ends_with("WHERE fsy_id = $3"));
        assert!(!sql.contains("Ana"));
    }

    #[test]
    fn match_type_wire_names() {
        assert_eq!(serde_json::to_value(MatchType::PhoneNumber).unwrap(), "phone_number");
        assert_eq!(serde_json::to_value(MatchType::Phone).unwrap(), "phone");
        assert_eq!(serde_json::to_value(MatchType::FsyId).unwrap(), "fsy_id");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn participant_search_prefers_exact_email() {
        let db = crate::db::repos::testing::TestDb::connect().await;
        let reg = db.registration("Participant", "Approved").await;
        let repo = RegistrationRepo::new(&db.pool);

        let term = SearchTerm::new(reg.email.as_deref()).unwrap();
        let (rows, match_type) = repo.search_participants(&term).await.unwrap();

        assert_eq!(match_type, MatchType::Email);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fsy_id, reg.fsy_id);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn profile_update_changes_only_given_fields() {
        let db = crate::db::repos::testing::TestDb::connect().await;
        let reg = db.registration("Counselor", "Pending").await;
        let repo = RegistrationRepo::new(&db.pool);

        let update =
            ProfileUpdate::from_json(json!({"shirt_size": "XL"}).as_object().unwrap()).unwrap();
        repo.update(reg.fsy_id, &update).await.unwrap();

        let after = repo.get(reg.fsy_id, None).await.unwrap();
        assert_eq!(after.shirt_size.as_deref(), Some("XL"));
        assert_eq!(after.first_name, reg.first_name);

        let err = repo.update(-1, &update).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn typed_get_rejects_other_type() {
        let db = crate::db::repos::testing::TestDb::connect().await;
        let reg = db.registration("Counselor", "Approved").await;
        let repo = RegistrationRepo::new(&db.pool);

        let err = repo
            .get(reg.fsy_id, Some(ParticipantType::Participant))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "participant", .. }));
    }
}
