use axum::{extract::State, http::StatusCode, Extension, Json};
use log::{info, warn};
use serde::Deserialize;
use std::sync::Arc;

use crate::core::shared::state::AppState;

use super::error::AuthError;
use super::middleware::AdminToken;
use super::session::AdminSession;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AdminSession>, AuthError> {
    if !state.credentials.verify(&req.password) {
        warn!("Rejected admin login attempt");
        return Err(AuthError::InvalidCredentials);
    }
    let session = state.sessions.issue().await;
    info!("Admin session issued, expires at {}", session.expires_at);
    Ok(Json(session))
}

pub async fn handle_logout(
    State(state): State<Arc<AppState>>,
    Extension(AdminToken(token)): Extension<AdminToken>,
) -> StatusCode {
    state.sessions.revoke(token).await;
    StatusCode::NO_CONTENT
}
