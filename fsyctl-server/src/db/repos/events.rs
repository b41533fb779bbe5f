//! Daily schedule repository

use chrono::{DateTime, NaiveTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::DbError;
use crate::models::{DayNumber, EventWindow};

/// A scheduled activity on one day of the program week
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyEvent {
    pub event_id: i32,
    pub event_name: String,
    pub day_number: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: Option<String>,
    pub attendance_required: bool,
    pub created_at: DateTime<Utc>,
}

/// Validated input for create/update
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub event_name: String,
    pub day: DayNumber,
    pub window: EventWindow,
    pub description: Option<String>,
    pub attendance_required: bool,
}

const COLUMNS: &str = "event_id, event_name, day_number, start_time, end_time, description, attendance_required, created_at";

pub struct EventRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Whole schedule ordered by day, then start time.
    pub async fn list(&self) -> Result<Vec<DailyEvent>, DbError> {
        let events = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM daily_events ORDER BY day_number, start_time"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(events)
    }

    pub async fn create(&self, event: &NewEvent) -> Result<DailyEvent, DbError> {
        let created: DailyEvent = sqlx::query_as(&format!(
            r#"
            INSERT INTO daily_events
                (event_name, day_number, start_time, end_time, description, attendance_required)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&event.event_name)
        .bind(event.day.get())
        .bind(event.window.start.get())
        .bind(event.window.end.get())
        .bind(event.description.as_deref())
        .bind(event.attendance_required)
        .fetch_one(self.pool)
        .await?;

        tracing::info!(event_id = created.event_id, day = created.day_number, "event created");
        Ok(created)
    }

    pub async fn update(&self, event_id: i32, event: &NewEvent) -> Result<DailyEvent, DbError> {
        sqlx::query_as(&format!(
            r#"
            UPDATE daily_events
            SET event_name = $2,
                day_number = $3,
                start_time = $4,
                end_time = $5,
                description = $6,
                attendance_required = $7
            WHERE event_id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(&event.event_name)
        .bind(event.day.get())
        .bind(event.window.start.get())
        .bind(event.window.end.get())
        .bind(event.description.as_deref())
        .bind(event.attendance_required)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("event", event_id))
    }

    pub async fn delete(&self, event_id: i32) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM daily_events WHERE event_id = $1")
            .bind(event_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("event", event_id));
        }
        tracing::info!(event_id, "event deleted");
        Ok(())
    }
}
