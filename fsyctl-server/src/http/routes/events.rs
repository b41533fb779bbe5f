//! Daily schedule endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;

use crate::db::repos::{DailyEvent, EventRepo, NewEvent};
use crate::http::error::ApiError;
use crate::http::extractors::{lenient_number, ApiJson, ValidPath};
use crate::http::server::AppState;
use crate::models::validation::required;
use crate::models::{DayNumber, Envelope, EventTime, EventWindow, ValidationError};

#[derive(Deserialize)]
pub struct EventRequest {
    pub event_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub day_number: Option<i64>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub description: Option<String>,
    /// `true`/`false`, `"Y"`/`"N"` or `1`/`0`
    pub attendance_required: Option<Value>,
}

fn flag(value: Option<&Value>) -> Result<bool, ValidationError> {
    let invalid = || ValidationError::InvalidFormat {
        field: "attendance_required",
        reason: "expected true/false or Y/N",
    };
    match value {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Number(n)) => Ok(n.as_i64().ok_or_else(invalid)? != 0),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" | "true" | "1" => Ok(true),
            "n" | "no" | "false" | "0" | "" => Ok(false),
            _ => Err(invalid()),
        },
        Some(_) => Err(invalid()),
    }
}

impl EventRequest {
    fn validate(self) -> Result<NewEvent, ValidationError> {
        let event_name = required("event_name", self.event_name.as_deref())?.to_string();
        let day = DayNumber::new(self.day_number.ok_or(ValidationError::Empty {
            field: "day_number",
        })?)?;
        let start = EventTime::parse("start_time", self.start_time.as_deref().unwrap_or_default())?;
        let end = EventTime::parse("end_time", self.end_time.as_deref().unwrap_or_default())?;
        let window = EventWindow::new(start, end)?;
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_owned);

        Ok(NewEvent {
            event_name,
            day,
            window,
            description,
            attendance_required: flag(self.attendance_required.as_ref())?,
        })
    }
}

/// GET /api/daily-events
async fn list_events(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<Vec<DailyEvent>>>, ApiError> {
    let events = EventRepo::new(&state.pool).list().await?;
    Ok(Json(Envelope::data(events)))
}

/// POST /api/daily-events
async fn create_event(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<EventRequest>,
) -> Result<(StatusCode, Json<Envelope<DailyEvent>>), ApiError> {
    let event = req.validate()?;
    let created = EventRepo::new(&state.pool).create(&event).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::data(created).with_message("Event created successfully")),
    ))
}

/// PUT /api/daily-events/{id}
async fn update_event(
    State(state): State<Arc<AppState>>,
    ValidPath(event_id): ValidPath<i32>,
    ApiJson(req): ApiJson<EventRequest>,
) -> Result<Json<Envelope<DailyEvent>>, ApiError> {
    let event = req.validate()?;
    let updated = EventRepo::new(&state.pool).update(event_id, &event).await?;
    Ok(Json(Envelope::data(updated).with_message("Event updated successfully")))
}

/// DELETE /api/daily-events/{id}
async fn delete_event(
    State(state): State<Arc<AppState>>,
    ValidPath(event_id): ValidPath<i32>,
) -> Result<Json<Envelope<()>>, ApiError> {
    EventRepo::new(&state.pool).delete(event_id).await?;
    Ok(Json(Envelope::message("Event deleted successfully")))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/daily-events", get(list_events).post(create_event))
        .route("/api/daily-events/{id}", put(update_event).delete(delete_event))
}
