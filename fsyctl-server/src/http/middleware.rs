//! Session check for protected routes

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::error::ApiError;
use super::server::AppState;
use crate::auth::{bearer_token, AuthError};

/// Reject requests without a valid bearer token; stash the claims otherwise.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token);

    let Some(token) = token else {
        return ApiError::from(AuthError::MissingToken).into_response();
    };

    match state.sessions.verify(token, chrono::Utc::now().timestamp()) {
        Ok(claims) => {
            tracing::debug!(user_id = claims.user_id, "session verified");
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(error = %e, path = %req.uri().path(), "session rejected");
            ApiError::from(e).into_response()
        }
    }
}
