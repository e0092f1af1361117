use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::shared::state::AppState;

use super::error::AuthError;

/// Session token of the authenticated admin, placed in request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminToken(pub Uuid);

fn bearer_token(request: &Request<Body>) -> Result<Uuid, AuthError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidFormat)?;
    Uuid::parse_str(token.trim()).map_err(|_| AuthError::InvalidToken)
}

/// Rejects requests without a live admin session with 401.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let token = match bearer_token(&request) {
        Ok(token) => token,
        Err(e) => {
            debug!("Admin request to {} rejected: {}", request.uri().path(), e);
            return Err(e);
        }
    };
    if !state.sessions.validate(token).await {
        return Err(AuthError::InvalidToken);
    }
    request.extensions_mut().insert(AdminToken(token));
    Ok(next.run(request).await)
}
