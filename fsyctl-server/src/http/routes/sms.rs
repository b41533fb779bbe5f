//! SMS reminders

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, AuthUser};
use crate::http::server::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsRequest {
    pub phone_number: Option<String>,
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct SmsResponse {
    pub success: bool,
    pub message: &'static str,
    pub result: Value,
}

/// POST /api/send-sms
async fn send_sms(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiJson(req): ApiJson<SmsRequest>,
) -> Result<Json<SmsResponse>, ApiError> {
    let number = req.phone_number.as_deref().map(str::trim).unwrap_or_default();
    let message = req.message.as_deref().map(str::trim).unwrap_or_default();
    if number.is_empty() || message.is_empty() {
        return Err(ApiError::bad_request("Missing phone number or message"));
    }

    let gateway = state.sms.as_ref().ok_or_else(|| ApiError::Unavailable {
        message: "SMS gateway is not configured".into(),
    })?;

    tracing::info!(user_id = user.user_id, "sending SMS");
    let result = gateway.send(number, message).await?;
    Ok(Json(SmsResponse {
        success: true,
        message: "SMS sent successfully",
        result,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/send-sms", post(send_sms))
}
