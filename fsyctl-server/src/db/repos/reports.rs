//! Dashboard aggregates and unit alerts
//!
//! Each breakdown is a `GROUP BY` over registrations of one participant type,
//! optionally narrowed to a stake. Labels are never null: blank values are
//! reported as "Unspecified".

use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::DbError;
use crate::models::{ParticipantType, RegistrationStatus, StakeFilter};

/// One bar of a chart
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct CountRow {
    pub label: String,
    pub count: i64,
}

/// Every chart on the dashboard page
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub age_distribution: Vec<CountRow>,
    pub gender_distribution: Vec<CountRow>,
    pub registration_status_breakdown: Vec<CountRow>,
    pub shirt_size_distribution: Vec<CountRow>,
    pub weekly_registration_growth: Vec<CountRow>,
    pub stake_participants: Vec<CountRow>,
    pub unit_participants: Vec<CountRow>,
    pub medical_information: Vec<CountRow>,
    pub dietary_information: Vec<CountRow>,
}

/// A unit that needs follow-up, with its leader's contact details
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UnitAlert {
    pub stake_name: String,
    pub unit_name: String,
    pub leader_name: Option<String>,
    pub leader_phone: Option<String>,
    pub leader_email: Option<String>,
    pub registered: i64,
    pub pending: i64,
}

/// How one breakdown labels and orders its groups
struct Breakdown {
    label: &'static str,
    order: &'static str,
    /// Rows without a value are left out instead of labelled "Unspecified"
    skip_blank: bool,
}

const AGE: Breakdown = Breakdown {
    label: "DATE_PART('year', AGE(CURRENT_DATE, birth_date))::INT::TEXT",
    order: "MIN(birth_date) DESC NULLS LAST",
    skip_blank: false,
};

const GENDER: Breakdown = Breakdown {
    label: "gender",
    order: "label",
    skip_blank: false,
};

const STATUS: Breakdown = Breakdown {
    label: "status",
    order: "label",
    skip_blank: false,
};

const SHIRT_SIZE: Breakdown = Breakdown {
    label: "shirt_size",
    order: "label",
    skip_blank: false,
};

const WEEKLY_GROWTH: Breakdown = Breakdown {
    label: "TO_CHAR(DATE_TRUNC('week', created_at), 'YYYY-MM-DD')",
    order: "label",
    skip_blank: false,
};

const STAKE: Breakdown = Breakdown {
    label: "stake_name",
    order: "count DESC, label",
    skip_blank: false,
};

const UNIT: Breakdown = Breakdown {
    label: "unit_name",
    order: "count DESC, label",
    skip_blank: false,
};

const MEDICAL: Breakdown = Breakdown {
    label: "medical_information",
    order: "count DESC, label",
    skip_blank: true,
};

const DIETARY: Breakdown = Breakdown {
    label: "dietary_information",
    order: "count DESC, label",
    skip_blank: true,
};

fn breakdown_sql(b: &Breakdown) -> String {
    let label = format!("COALESCE(NULLIF(TRIM({}), ''), 'Unspecified')", b.label);
    let blank_filter = if b.skip_blank {
        format!("AND NULLIF(TRIM({}), '') IS NOT NULL", b.label)
    } else {
        String::new()
    };
    format!(
        r#"
        SELECT {label} AS label, COUNT(*)::BIGINT AS count
        FROM registrations
        WHERE participant_type = $1
            AND ($2 = '' OR stake_name = $2)
            {blank_filter}
        GROUP BY 1
        ORDER BY {order}
        "#,
        order = b.order,
    )
}

pub struct ReportRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ReportRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    async fn breakdown(
        &self,
        b: &Breakdown,
        kind: ParticipantType,
        stake: &StakeFilter,
    ) -> Result<Vec<CountRow>, DbError> {
        let rows = sqlx::query_as(&breakdown_sql(b))
            .bind(kind.as_str())
            .bind(stake.as_bind())
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// All dashboard charts. The stake chart always covers every stake.
    pub async fn dashboard(
        &self,
        kind: ParticipantType,
        stake: &StakeFilter,
    ) -> Result<Dashboard, DbError> {
        let all_stakes = StakeFilter::new(None);
        Ok(Dashboard {
            age_distribution: self.breakdown(&AGE, kind, stake).await?,
            gender_distribution: self.breakdown(&GENDER, kind, stake).await?,
            registration_status_breakdown: self.breakdown(&STATUS, kind, stake).await?,
            shirt_size_distribution: self.breakdown(&SHIRT_SIZE, kind, stake).await?,
            weekly_registration_growth: self.breakdown(&WEEKLY_GROWTH, kind, stake).await?,
            stake_participants: self.breakdown(&STAKE, kind, &all_stakes).await?,
            unit_participants: self.breakdown(&UNIT, kind, stake).await?,
            medical_information: self.breakdown(&MEDICAL, kind, stake).await?,
            dietary_information: self.breakdown(&DIETARY, kind, stake).await?,
        })
    }

    pub async fn dietary(
        &self,
        kind: ParticipantType,
        stake: &StakeFilter,
    ) -> Result<Vec<CountRow>, DbError> {
        self.breakdown(&DIETARY, kind, stake).await
    }

    /// Units with fewer than `threshold` registrations of `kind`, fewest first.
    pub async fn low_registration_units(
        &self,
        kind: ParticipantType,
        threshold: i64,
    ) -> Result<Vec<UnitAlert>, DbError> {
        let rows = sqlx::query_as(&unit_alert_sql(
            "HAVING COUNT(r.fsy_id) < $3",
            "registered, u.stake_name, u.unit_name",
        ))
        .bind(kind.as_str())
        .bind(RegistrationStatus::Pending.as_str())
        .bind(threshold)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Units with at least one registration of `kind` still pending.
    pub async fn units_waiting_approval(
        &self,
        kind: ParticipantType,
    ) -> Result<Vec<UnitAlert>, DbError> {
        let rows = sqlx::query_as(&unit_alert_sql(
            "HAVING COUNT(r.fsy_id) FILTER (WHERE r.status = $2) > 0",
            "pending DESC, u.stake_name, u.unit_name",
        ))
        .bind(kind.as_str())
        .bind(RegistrationStatus::Pending.as_str())
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}

/// `$1` is the participant type, `$2` the pending status.
fn unit_alert_sql(having: &str, order: &str) -> String {
    format!(
        r#"
        SELECT
            u.stake_name,
            u.unit_name,
            u.leader_name,
            u.leader_phone,
            u.leader_email,
            COUNT(r.fsy_id)::BIGINT AS registered,
            (COUNT(r.fsy_id) FILTER (WHERE r.status = $2))::BIGINT AS pending
        FROM units u
        LEFT JOIN registrations r
            ON r.unit_name = u.unit_name AND r.participant_type = $1
        GROUP BY u.stake_name, u.unit_name, u.leader_name, u.leader_phone, u.leader_email
        {having}
        ORDER BY {order}
        "#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::testing::TestDb;

    #[test]
    fn breakdown_sql_filters_by_type_and_optional_stake() {
        let sql = breakdown_sql(&GENDER);
        assert!(sql.contains("participant_type = $1"));
        assert!(sql.contains("($2 = '' OR stake_name = $2)"));
        assert!(!sql.contains("IS NOT NULL"));
    }

    #[test]
    fn free_text_breakdowns_skip_blank_rows() {
        assert!(breakdown_sql(&MEDICAL).contains("IS NOT NULL"));
        assert!(breakdown_sql(&DIETARY).contains("IS NOT NULL"));
    }

    #[test]
    fn low_registration_query_uses_threshold_bind() {
        let sql = unit_alert_sql("HAVING COUNT(r.fsy_id) < $3", "registered");
        assert!(sql.contains("LEFT JOIN registrations"));
        assert!(sql.contains("< $3"));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn dashboard_counts_registrations() {
        let db = TestDb::connect().await;
        db.registration("Counselor", "Pending").await;

        let dashboard = ReportRepo::new(&db.pool)
            .dashboard(ParticipantType::Counselor, &StakeFilter::new(Some("Test Stake")))
            .await
            .unwrap();

        let pending = dashboard
            .registration_status_breakdown
            .iter()
            .find(|row| row.label == "Pending")
            .unwrap();
        assert!(pending.count >= 1);
        assert!(dashboard.stake_participants.iter().any(|row| row.label == "Test Stake"));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn unit_alerts() {
        let db = TestDb::connect().await;
        sqlx::query("INSERT INTO stakes (stake_name) VALUES ('Test Stake') ON CONFLICT DO NOTHING")
            .execute(&db.pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO units (unit_name, stake_name, leader_name) VALUES ('Test Ward', 'Test Stake', 'Bishop Test') ON CONFLICT DO NOTHING",
        )
        .execute(&db.pool)
        .await
        .unwrap();
        db.registration("Participant", "Pending").await;

        let repo = ReportRepo::new(&db.pool);
        let waiting = repo
            .units_waiting_approval(ParticipantType::Participant)
            .await
            .unwrap();
        assert!(waiting.iter().any(|u| u.unit_name == "Test Ward" && u.pending >= 1));

        let low = repo
            .low_registration_units(ParticipantType::Participant, i64::MAX)
            .await
            .unwrap();
        assert!(low.iter().any(|u| u.unit_name == "Test Ward"));
    }
}
