//! Company and group management

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::repos::{
    Company, CompanyRepo, CompanyWithCounts, CompanyWithGroups, Group, GroupRepo, NewGroup,
};
use crate::http::error::ApiError;
use crate::http::extractors::{lenient_number, ApiJson, ValidPath};
use crate::http::server::AppState;
use crate::models::{CompanyName, Envelope, GroupName};

#[derive(Deserialize)]
pub struct GroupInput {
    #[serde(default, deserialize_with = "lenient_number")]
    pub number: Option<i32>,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct CompanyRequest {
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub company_number: Option<i32>,
    pub description: Option<String>,
    #[serde(default)]
    pub groups: Vec<GroupInput>,
}

#[derive(Deserialize)]
pub struct GroupRequest {
    pub group_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub group_number: Option<i32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextNumber {
    pub success: bool,
    pub next_number: i32,
}

fn company_name(req: &CompanyRequest) -> Result<CompanyName, ApiError> {
    CompanyName::new(req.company_name.as_deref().unwrap_or_default())
        .map_err(|_| ApiError::bad_request("Company name is required"))
}

/// Groups with blank names are dropped.
fn new_groups(inputs: &[GroupInput]) -> Vec<NewGroup> {
    inputs
        .iter()
        .filter_map(|g| {
            let name = GroupName::new(g.name.as_deref()?).ok()?;
            Some(NewGroup {
                number: g.number,
                name,
            })
        })
        .collect()
}

/// GET /api/company
async fn list_companies(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<Vec<CompanyWithCounts>>>, ApiError> {
    let companies = CompanyRepo::new(&state.pool).list().await?;
    Ok(Json(Envelope::data(companies)))
}

/// POST /api/company
async fn create_company(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CompanyRequest>,
) -> Result<(StatusCode, Json<Envelope<CompanyWithGroups>>), ApiError> {
    let name = company_name(&req)?;
    let groups = new_groups(&req.groups);
    let created = CompanyRepo::new(&state.pool)
        .create(&name, req.company_number, req.description.as_deref(), &groups)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::data(created).with_message("Company created successfully")),
    ))
}

/// GET /api/company/next-number
async fn next_number(State(state): State<Arc<AppState>>) -> Result<Json<NextNumber>, ApiError> {
    let next_number = CompanyRepo::new(&state.pool).next_number().await?;
    Ok(Json(NextNumber {
        success: true,
        next_number,
    }))
}

/// GET /api/company/{id}
async fn get_company(
    State(state): State<Arc<AppState>>,
    ValidPath(company_id): ValidPath<i32>,
) -> Result<Json<Envelope<CompanyWithGroups>>, ApiError> {
    let company = CompanyRepo::new(&state.pool).get(company_id).await?;
    Ok(Json(Envelope::data(company)))
}

/// PUT /api/company/{id}
async fn update_company(
    State(state): State<Arc<AppState>>,
    ValidPath(company_id): ValidPath<i32>,
    ApiJson(req): ApiJson<CompanyRequest>,
) -> Result<Json<Envelope<Company>>, ApiError> {
    let name = company_name(&req)?;
    let company = CompanyRepo::new(&state.pool)
        .update(company_id, &name, req.company_number, req.description.as_deref())
        .await?;
    Ok(Json(Envelope::data(company).with_message("Company updated successfully")))
}

/// DELETE /api/company/{id}
async fn delete_company(
    State(state): State<Arc<AppState>>,
    ValidPath(company_id): ValidPath<i32>,
) -> Result<Json<Envelope<()>>, ApiError> {
    CompanyRepo::new(&state.pool).delete(company_id).await?;
    Ok(Json(Envelope::message("Company deleted successfully")))
}

fn group_name(req: &GroupRequest) -> Result<GroupName, ApiError> {
    GroupName::new(req.group_name.as_deref().unwrap_or_default())
        .map_err(|_| ApiError::bad_request("Group name is required"))
}

/// GET /api/company/{id}/groups
async fn list_groups(
    State(state): State<Arc<AppState>>,
    ValidPath(company_id): ValidPath<i32>,
) -> Result<Json<Envelope<Vec<Group>>>, ApiError> {
    let groups = GroupRepo::new(&state.pool).list_for_company(company_id).await?;
    Ok(Json(Envelope::data(groups)))
}

/// POST /api/company/{id}/groups
async fn create_group(
    State(state): State<Arc<AppState>>,
    ValidPath(company_id): ValidPath<i32>,
    ApiJson(req): ApiJson<GroupRequest>,
) -> Result<(StatusCode, Json<Envelope<Group>>), ApiError> {
    let name = group_name(&req)?;
    let group = GroupRepo::new(&state.pool)
        .create(company_id, req.group_number, &name)
        .await?;
    Ok((StatusCode::CREATED, Json(Envelope::data(group))))
}

/// PUT /api/company/{id}/groups/{group_id}
async fn update_group(
    State(state): State<Arc<AppState>>,
    ValidPath((company_id, group_id)): ValidPath<(i32, i32)>,
    ApiJson(req): ApiJson<GroupRequest>,
) -> Result<Json<Envelope<Group>>, ApiError> {
    let name = group_name(&req)?;
    let group = GroupRepo::new(&state.pool)
        .update(company_id, group_id, req.group_number, &name)
        .await?;
    Ok(Json(Envelope::data(group)))
}

/// DELETE /api/company/{id}/groups/{group_id}
async fn delete_group(
    State(state): State<Arc<AppState>>,
    ValidPath((company_id, group_id)): ValidPath<(i32, i32)>,
) -> Result<Json<Envelope<()>>, ApiError> {
    GroupRepo::new(&state.pool).delete(company_id, group_id).await?;
    Ok(Json(Envelope::message("Group deleted successfully")))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/company", get(list_companies).post(create_company))
        .route("/api/companies", get(list_companies))
        .route("/api/company/next-number", get(next_number))
        .route(
            "/api/company/{id}",
            get(get_company).put(update_company).delete(delete_company),
        )
        .route("/api/company/{id}/groups", get(list_groups).post(create_group))
        .route(
            "/api/company/{id}/groups/{group_id}",
            put(update_group).delete(delete_group),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use serde_json::json;

    use crate::http::server::tests::{app, send};

    #[test]
    fn blank_groups_are_dropped() {
        let inputs: Vec<GroupInput> = serde_json::from_value(json!([
            {"number": 1, "name": "Group 1"},
            {"number": "2", "name": "  "},
            {"name": null},
            {"name": "Group 3"}
        ]))
        .unwrap();

        let groups = new_groups(&inputs);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].number, Some(1));
        assert_eq!(groups[1].name.as_str(), "Group 3");
        assert_eq!(groups[1].number, None);
    }

    #[tokio::test]
    async fn blank_company_name_is_400() {
        for body in [json!({}), json!({"company_name": "   "})] {
            let (status, json) =
                send(app(None), Method::POST, "/api/company", Some(body), true).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["message"], "Company name is required");
        }

        let (status, _) = send(
            app(None),
            Method::PUT,
            "/api/company/1",
            Some(json!({"company_name": ""})),
            true,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn blank_group_name_is_400() {
        let (status, json) = send(
            app(None),
            Method::POST,
            "/api/company/1/groups",
            Some(json!({"group_number": 2})),
            true,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Group name is required");
    }

    #[tokio::test]
    async fn bad_company_number_is_400() {
        let (status, _) = send(
            app(None),
            Method::POST,
            "/api/company",
            Some(json!({"company_name": "Alpha", "company_number": "one"})),
            true,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_numeric_group_path_is_400() {
        let (status, _) =
            send(app(None), Method::DELETE, "/api/company/1/groups/x", None, true).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
