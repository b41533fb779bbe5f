//! Participant, counselor and profile lookups plus the profile editor

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::db::repos::{
    AssignableRegistrant, MatchType, RegistrantFilter, RegistrantSummary, Registration,
    RegistrationRepo, UnitRegistrant,
};
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ValidPath};
use crate::http::server::AppState;
use crate::models::validation::required;
use crate::models::{Envelope, ParticipantType, ProfileUpdate, SearchTerm};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub stake_name: Option<String>,
    pub unit_name: Option<String>,
    pub status: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> Result<RegistrantFilter, ApiError> {
        let search = match self.search.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(term) => Some(SearchTerm::new(Some(term))?),
        };
        Ok(RegistrantFilter {
            search,
            stake_name: self.stake_name,
            unit_name: self.unit_name,
            status: self.status,
        })
    }
}

#[derive(Deserialize)]
pub struct TermQuery {
    pub term: Option<String>,
}

#[derive(Deserialize)]
pub struct UnitQuery {
    pub participant_type: Option<String>,
    pub unit_name: Option<String>,
}

/// Search results tagged with how the term matched.
///
/// The participant search reports `matchType`; profile and registration
/// searches report `searchType`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults<T> {
    pub success: bool,
    pub data: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_type: Option<MatchType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_type: Option<MatchType>,
}

impl<T> SearchResults<T> {
    fn by_match(data: Vec<T>, kind: MatchType) -> Self {
        Self {
            success: true,
            data,
            match_type: Some(kind),
            search_type: None,
        }
    }

    fn by_search(data: Vec<T>, kind: MatchType) -> Self {
        Self {
            success: true,
            data,
            match_type: None,
            search_type: Some(kind),
        }
    }
}

async fn list_of(
    state: &AppState,
    kind: ParticipantType,
    query: ListQuery,
) -> Result<Json<Envelope<Vec<RegistrantSummary>>>, ApiError> {
    let filter = query.into_filter()?;
    let rows = RegistrationRepo::new(&state.pool).list(kind, &filter).await?;
    Ok(Json(Envelope::data(rows)))
}

/// GET /api/participants
async fn list_participants(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Vec<RegistrantSummary>>>, ApiError> {
    list_of(&state, ParticipantType::Participant, query).await
}

/// GET /api/counselors
async fn list_counselors(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Vec<RegistrantSummary>>>, ApiError> {
    list_of(&state, ParticipantType::Counselor, query).await
}

/// GET /api/participants/search?term=
async fn search_participants(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TermQuery>,
) -> Result<Json<SearchResults<RegistrantSummary>>, ApiError> {
    let term = SearchTerm::new(query.term.as_deref())?;
    let (rows, kind) = RegistrationRepo::new(&state.pool)
        .search_participants(&term)
        .await?;
    Ok(Json(SearchResults::by_match(rows, kind)))
}

/// GET /api/participants/{id}
async fn get_participant(
    State(state): State<Arc<AppState>>,
    ValidPath(fsy_id): ValidPath<i64>,
) -> Result<Json<Envelope<Registration>>, ApiError> {
    let row = RegistrationRepo::new(&state.pool)
        .get(fsy_id, Some(ParticipantType::Participant))
        .await?;
    Ok(Json(Envelope::data(row)))
}

/// GET /api/profiles/search?term=
async fn search_profiles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TermQuery>,
) -> Result<Json<SearchResults<RegistrantSummary>>, ApiError> {
    let term = SearchTerm::new(query.term.as_deref())?;
    let (rows, kind) = RegistrationRepo::new(&state.pool)
        .search_profiles(&term)
        .await?;
    Ok(Json(SearchResults::by_search(rows, kind)))
}

/// GET /api/profiles/{id}
async fn get_profile(
    State(state): State<Arc<AppState>>,
    ValidPath(fsy_id): ValidPath<i64>,
) -> Result<Json<Envelope<Registration>>, ApiError> {
    let row = RegistrationRepo::new(&state.pool).get(fsy_id, None).await?;
    Ok(Json(Envelope::data(row)))
}

/// PUT /api/profiles/{id}/update (also /api/participants/{id}/update)
async fn update_profile(
    State(state): State<Arc<AppState>>,
    ValidPath(fsy_id): ValidPath<i64>,
    ApiJson(body): ApiJson<Map<String, Value>>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let update = ProfileUpdate::from_json(&body)?;
    RegistrationRepo::new(&state.pool).update(fsy_id, &update).await?;
    tracing::info!(fsy_id, fields = update.fields().len(), "profile updated");
    Ok(Json(Envelope::message("Profile updated successfully")))
}

/// GET /api/registrations/search?term=
async fn search_registrations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TermQuery>,
) -> Result<Json<SearchResults<AssignableRegistrant>>, ApiError> {
    let term = SearchTerm::new(query.term.as_deref())?;
    let (rows, kind) = RegistrationRepo::new(&state.pool)
        .search_unassigned(&term)
        .await?;
    Ok(Json(SearchResults::by_search(rows, kind)))
}

/// GET /api/get_registrants_by_unit?participant_type=&unit_name=
async fn registrants_by_unit(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UnitQuery>,
) -> Result<Json<Envelope<Vec<UnitRegistrant>>>, ApiError> {
    let kind = ParticipantType::parse(query.participant_type.as_deref())?;
    let unit = required("unit_name", query.unit_name.as_deref())?;
    let rows = RegistrationRepo::new(&state.pool).by_unit(kind, unit).await?;
    Ok(Json(Envelope::data(rows)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/participants", get(list_participants))
        .route("/api/participants/search", get(search_participants))
        .route("/api/participants/{id}", get(get_participant))
        .route("/api/participants/{id}/update", put(update_profile))
        .route("/api/counselors", get(list_counselors))
        .route("/api/profiles/search", get(search_profiles))
        .route("/api/profiles/{id}", get(get_profile))
        .route("/api/profiles/{id}/update", put(update_profile))
        .route("/api/registrations/search", get(search_registrations))
        .route("/api/get_registrants_by_unit", get(registrants_by_unit))
}
