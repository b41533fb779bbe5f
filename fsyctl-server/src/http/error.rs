//! API error type with IntoResponse
//!
//! Every failure renders as `{"success": false, "error": <code>, "message": <text>}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::auth::AuthError;
use crate::db::repos::DbError;
use crate::export::ExportError;
use crate::models::ValidationError;
use crate::sms::SmsError;

#[derive(Debug)]
pub enum ApiError {
    /// Input failed validation (400)
    Validation(ValidationError),

    /// Request is well-formed but not acceptable (400)
    BadRequest { message: String },

    /// Missing or invalid credentials (401)
    Unauthorized { message: String },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Uniqueness or reference conflict (409)
    Conflict { message: String },

    /// Upstream gateway failed (502)
    Gateway { message: String },

    /// Feature not configured (503)
    Unavailable { message: String },

    /// Database error (500, logged)
    Database(DbError),

    /// Internal error (500, logged)
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Gateway { .. } => StatusCode::BAD_GATEWAY,
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self {
            Self::Validation(e) => ("validation_error", e.to_string()),
            Self::BadRequest { message } => ("bad_request", message),
            Self::Unauthorized { message } => ("unauthorized", message),
            Self::NotFound { resource, id } => {
                ("not_found", format!("{} '{}' not found", resource, id))
            }
            Self::Conflict { message } => ("conflict", message),
            Self::Gateway { message } => {
                tracing::warn!("Gateway error: {}", message);
                ("gateway_error", message)
            }
            Self::Unavailable { message } => ("unavailable", message),
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                ("internal_error", "an internal error occurred".to_string())
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                ("internal_error", "an internal error occurred".to_string())
            }
        };

        let body = json!({
            "success": false,
            "error": code,
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Conflict { message } => Self::Conflict { message },
            DbError::Rejected { message } => Self::bad_request(message),
            DbError::Sqlx(_) => Self::Database(e),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => Self::unauthorized("Invalid email or password"),
            AuthError::MissingToken
            | AuthError::MalformedToken
            | AuthError::BadSignature
            | AuthError::Expired => Self::unauthorized(e.to_string()),
            AuthError::WeakSecret { .. }
            | AuthError::InvalidTtl { .. }
            | AuthError::Encode(_) => Self::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<SmsError> for ApiError {
    fn from(e: SmsError) -> Self {
        Self::Gateway {
            message: e.to_string(),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        Self::Internal {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_is_400() {
        let err = ApiError::Validation(ValidationError::Empty { field: "company_name" });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], "company_name is required");
    }

    #[tokio::test]
    async fn db_errors_map_by_kind() {
        let cases = [
            (DbError::not_found("company", 3), StatusCode::NOT_FOUND),
            (
                DbError::Conflict { message: "dup".into() },
                StatusCode::CONFLICT,
            ),
            (
                DbError::Rejected { message: "Only approved members can be added to a company" },
                StatusCode::BAD_REQUEST,
            ),
            (
                DbError::Sqlx(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn database_error_hides_details() {
        let body = body_json(ApiError::from(DbError::Sqlx(sqlx::Error::PoolTimedOut)).into_response()).await;
        assert_eq!(body["message"], "an internal error occurred");
    }

    #[tokio::test]
    async fn auth_errors_are_401() {
        for err in [AuthError::MissingToken, AuthError::Expired, AuthError::InvalidCredentials] {
            assert_eq!(
                ApiError::from(err).into_response().status(),
                StatusCode::UNAUTHORIZED
            );
        }
    }

    #[tokio::test]
    async fn sms_failure_is_502() {
        let err = ApiError::from(SmsError::Rejected("Invalid number".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["error"], "gateway_error");
    }

    #[test]
    fn unavailable_is_503() {
        let err = ApiError::Unavailable { message: "SMS is not configured".into() };
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
