//! Stake and unit dropdown data

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::repos::{ReferenceRepo, Stake, Unit};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::Envelope;

#[derive(Deserialize)]
pub struct UnitsQuery {
    pub stake_name: Option<String>,
}

/// GET /api/stakes
async fn list_stakes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<Vec<Stake>>>, ApiError> {
    let stakes = ReferenceRepo::new(&state.pool).stakes().await?;
    Ok(Json(Envelope::data(stakes)))
}

/// GET /api/units?stake_name=
async fn list_units(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UnitsQuery>,
) -> Result<Json<Envelope<Vec<Unit>>>, ApiError> {
    let stake = query.stake_name.unwrap_or_default();
    let units = ReferenceRepo::new(&state.pool).units(stake.trim()).await?;
    Ok(Json(Envelope::data(units)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/stakes", get(list_stakes))
        .route("/api/units", get(list_units))
}
