//! Dashboard charts and unit follow-up reports

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::repos::{CountRow, Dashboard, ReportRepo, UnitAlert};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{Envelope, ParticipantType, StakeFilter};

#[derive(Deserialize)]
pub struct ReportQuery {
    pub participant_type: Option<String>,
    pub stake_name: Option<String>,
}

impl ReportQuery {
    fn kind(&self) -> Result<ParticipantType, ApiError> {
        Ok(ParticipantType::parse(self.participant_type.as_deref())?)
    }

    fn stake(&self) -> StakeFilter {
        StakeFilter::new(self.stake_name.as_deref())
    }
}

/// GET /api/dashboard?participant_type=&stake_name=
async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Dashboard>, ApiError> {
    let kind = query.kind()?;
    let stake = query.stake();
    tracing::debug!(%kind, all_stakes = stake.is_all(), "building dashboard");
    let dashboard = ReportRepo::new(&state.pool).dashboard(kind, &stake).await?;
    Ok(Json(dashboard))
}

/// GET /api/dietary_information?participant_type=&stake_name=
async fn dietary_information(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Envelope<Vec<CountRow>>>, ApiError> {
    let rows = ReportRepo::new(&state.pool)
        .dietary(query.kind()?, &query.stake())
        .await?;
    Ok(Json(Envelope::data(rows)))
}

/// GET /api/units_low_registrations?participant_type=
async fn units_low_registrations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Envelope<Vec<UnitAlert>>>, ApiError> {
    let rows = ReportRepo::new(&state.pool)
        .low_registration_units(query.kind()?, state.low_registration_threshold)
        .await?;
    Ok(Json(Envelope::data(rows)))
}

/// GET /api/units_waiting_approval?participant_type=
async fn units_waiting_approval(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Envelope<Vec<UnitAlert>>>, ApiError> {
    let rows = ReportRepo::new(&state.pool)
        .units_waiting_approval(query.kind()?)
        .await?;
    Ok(Json(Envelope::data(rows)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/dashboard", get(dashboard))
        .route("/api/dietary_information", get(dietary_information))
        .route("/api/units_low_registrations", get(units_low_registrations))
        .route("/api/units_waiting_approval", get(units_waiting_approval))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::http::server::tests::{app, send};

    #[tokio::test]
    async fn participant_type_is_required_and_checked() {
        for uri in [
            "/api/dashboard",
            "/api/dashboard?participant_type=participant",
            "/api/dietary_information?participant_type=",
            "/api/units_low_registrations?participant_type=Staff",
            "/api/units_waiting_approval",
        ] {
            let (status, body) = send(app(None), Method::GET, uri, None, true).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["error"], "validation_error");
        }
    }
}
