//! Coordinator login and registrant account signup

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::{hash_secret, is_valid_pin, verify_secret, AuthError};
use crate::db::repos::{NewUser, RegistrationRepo, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::ApiJson;
use crate::http::server::AppState;
use crate::models::profile::parse_birth_date;
use crate::models::{Envelope, ParticipantType};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub full_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
    pub birth_date: Option<String>,
    pub pin: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// POST /api/login
async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (Some(username), Some(password)) = (present(&req.username), req.password.as_deref())
    else {
        return Err(ApiError::bad_request("Missing username or password"));
    };
    if password.is_empty() {
        return Err(ApiError::bad_request("Missing username or password"));
    }

    let user = UserRepo::new(&state.pool)
        .find_coordinator(username)
        .await?
        .filter(|user| verify_secret(password, &user.password_hash));

    let Some(user) = user else {
        tracing::info!("login rejected");
        return Err(AuthError::InvalidCredentials.into());
    };

    let token = state.sessions.issue(
        user.user_id,
        &user.user_type,
        &user.full_name,
        chrono::Utc::now().timestamp(),
    )?;
    tracing::info!(user_id = user.user_id, "coordinator signed in");

    Ok(Json(LoginResponse {
        success: true,
        token,
        full_name: user.full_name,
    }))
}

/// Create a login for a registrant whose details match their registration.
async fn signup(
    state: &AppState,
    kind: ParticipantType,
    req: SignupRequest,
) -> Result<(StatusCode, Json<Envelope<()>>), ApiError> {
    let (Some(full_name), Some(email), Some(mobile), Some(birth_date), Some(pin)) = (
        present(&req.full_name),
        present(&req.email),
        present(&req.mobile_number),
        present(&req.birth_date),
        present(&req.pin),
    ) else {
        return Err(ApiError::bad_request("All fields are required"));
    };

    let birth_date = parse_birth_date(birth_date)?;
    if !is_valid_pin(pin) {
        return Err(ApiError::bad_request("PIN must be 4 to 8 digits"));
    }

    let matched = RegistrationRepo::new(&state.pool)
        .matches_signup(kind, email, mobile, birth_date)
        .await?;
    if !matched {
        return Err(ApiError::unauthorized(format!(
            "{} not found or details do not match",
            kind
        )));
    }

    let users = UserRepo::new(&state.pool);
    if users.email_exists(email).await? {
        return Err(ApiError::Conflict {
            message: format!("{} already registered", kind),
        });
    }

    users
        .create(&NewUser {
            full_name: full_name.to_string(),
            email: email.to_string(),
            phone_number: Some(mobile.to_string()),
            birth_date: Some(birth_date),
            password_hash: hash_secret(pin),
            user_type: kind.into(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::message(format!("{} registered successfully", kind))),
    ))
}

/// POST /api/participant-signup
async fn participant_signup(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<Envelope<()>>), ApiError> {
    signup(&state, ParticipantType::Participant, req).await
}

/// POST /api/counselor-signup
async fn counselor_signup(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<Envelope<()>>), ApiError> {
    signup(&state, ParticipantType::Counselor, req).await
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/participant-signup", post(participant_signup))
        .route("/api/counselor-signup", post(counselor_signup))
}
