//! Company membership: assignment, moves, search and CSV export

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::repos::{MemberAssignment, MemberRepo, MemberRow, MemberSearchRow};
use crate::export::{members_csv, members_filename};
use crate::http::error::ApiError;
use crate::http::extractors::{lenient_number, ApiJson, AuthUser, ValidPath};
use crate::http::server::AppState;
use crate::models::{Envelope, SearchTerm};

#[derive(Deserialize)]
pub struct MembersQuery {
    pub company_id: Option<String>,
    pub group_id: Option<String>,
}

#[derive(Deserialize)]
pub struct AssignRequest {
    #[serde(default, deserialize_with = "lenient_number")]
    pub fsy_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub company_id: Option<i32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub group_id: Option<i32>,
}

#[derive(Deserialize)]
pub struct TermQuery {
    pub term: Option<String>,
}

/// Optional numeric query parameter; blank means absent.
fn query_id(value: Option<&str>, message: &'static str) -> Result<Option<i32>, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse().map(Some).map_err(|_| ApiError::bad_request(message)),
    }
}

/// GET /api/company/members?company_id=&group_id=
async fn list_members(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MembersQuery>,
) -> Result<Json<Envelope<Vec<MemberRow>>>, ApiError> {
    let company_id = query_id(query.company_id.as_deref(), "Company ID is required")?
        .ok_or_else(|| ApiError::bad_request("Company ID is required"))?;
    let group_id = query_id(query.group_id.as_deref(), "Invalid group ID")?;

    let members = MemberRepo::new(&state.pool).list(company_id, group_id).await?;
    Ok(Json(Envelope::data(members)))
}

/// POST /api/company/members
async fn add_member(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiJson(req): ApiJson<AssignRequest>,
) -> Result<(StatusCode, Json<Envelope<()>>), ApiError> {
    let ids = (
        req.fsy_id.filter(|id| *id > 0),
        req.company_id.filter(|id| *id > 0),
        req.group_id.filter(|id| *id > 0),
    );
    let (Some(fsy_id), Some(company_id), Some(group_id)) = ids else {
        return Err(ApiError::bad_request(
            "FSY ID, Company ID, and Group ID are required",
        ));
    };

    MemberRepo::new(&state.pool)
        .add(fsy_id, company_id, group_id)
        .await?;
    tracing::debug!(fsy_id, assigned_by = user.user_id, "member assignment recorded");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::message("Member added successfully")),
    ))
}

/// GET /api/company/members/{fsy_id}
async fn get_member(
    State(state): State<Arc<AppState>>,
    ValidPath(fsy_id): ValidPath<i64>,
) -> Result<Json<Envelope<MemberAssignment>>, ApiError> {
    let member = MemberRepo::new(&state.pool).get(fsy_id).await?;
    Ok(Json(Envelope::data(member)))
}

/// PUT /api/company/members/{fsy_id}
async fn move_member(
    State(state): State<Arc<AppState>>,
    ValidPath(fsy_id): ValidPath<i64>,
    ApiJson(req): ApiJson<AssignRequest>,
) -> Result<Json<Envelope<MemberAssignment>>, ApiError> {
    let (Some(company_id), Some(group_id)) = (req.company_id, req.group_id) else {
        return Err(ApiError::bad_request("Company ID and Group ID are required"));
    };

    let member = MemberRepo::new(&state.pool)
        .reassign(fsy_id, company_id, group_id)
        .await?;
    Ok(Json(Envelope::data(member).with_message("Member moved successfully")))
}

/// DELETE /api/company/members/{fsy_id}
async fn remove_member(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ValidPath(fsy_id): ValidPath<i64>,
) -> Result<Json<Envelope<()>>, ApiError> {
    MemberRepo::new(&state.pool).remove(fsy_id).await?;
    tracing::debug!(fsy_id, removed_by = user.user_id, "member removal recorded");
    Ok(Json(Envelope::message("Member removed from company successfully")))
}

/// GET /api/company/members/search?term=
async fn search_members(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TermQuery>,
) -> Result<Json<Envelope<Vec<MemberSearchRow>>>, ApiError> {
    let term = SearchTerm::new(query.term.as_deref())?;
    let rows = MemberRepo::new(&state.pool).search(&term).await?;
    Ok(Json(Envelope::data(rows)))
}

/// GET /api/company/members/export
async fn export_members(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let rows = MemberRepo::new(&state.pool).export_rows().await?;
    let body = members_csv(&rows)?;
    let filename = members_filename(chrono::Local::now().date_naive());
    tracing::info!(rows = rows.len(), %filename, "members exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/company/members", get(list_members).post(add_member))
        .route("/api/company/members/search", get(search_members))
        .route("/api/company/members/export", get(export_members))
        .route(
            "/api/company/members/{fsy_id}",
            get(get_member).put(move_member).delete(remove_member),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use serde_json::json;

    use crate::http::server::tests::{app, send};

    #[test]
    fn query_ids() {
        assert_eq!(query_id(None, "x").unwrap(), None);
        assert_eq!(query_id(Some(" "), "x").unwrap(), None);
        assert_eq!(query_id(Some("12"), "x").unwrap(), Some(12));
        assert!(query_id(Some("twelve"), "x").is_err());
    }

    #[tokio::test]
    async fn listing_requires_company_id() {
        let (status, body) =
            send(app(None), Method::GET, "/api/company/members", None, true).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Company ID is required");
    }

    #[tokio::test]
    async fn add_requires_all_ids() {
        let (status, body) = send(
            app(None),
            Method::POST,
            "/api/company/members",
            Some(json!({"fsy_id": "1001", "company_id": 1})),
            true,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "FSY ID, Company ID, and Group ID are required");
    }

    #[tokio::test]
    async fn add_rejects_zero_ids() {
        for body in [
            json!({"fsy_id": 0, "company_id": 1, "group_id": 1}),
            json!({"fsy_id": "1001", "company_id": "0", "group_id": 1}),
            json!({"fsy_id": 1001, "company_id": 1, "group_id": -3}),
        ] {
            let (status, resp) = send(
                app(None),
                Method::POST,
                "/api/company/members",
                Some(body.clone()),
                true,
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(resp["message"], "FSY ID, Company ID, and Group ID are required");
        }
    }

    #[tokio::test]
    async fn move_requires_target() {
        let (status, _) = send(
            app(None),
            Method::PUT,
            "/api/company/members/1001",
            Some(json!({"company_id": 2})),
            true,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn search_requires_term() {
        let (status, _) =
            send(app(None), Method::GET, "/api/company/members/search", None, true).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
