//! Admin gate: a password check that yields short-lived bearer sessions.

pub mod credentials;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod session;

use axum::{routing::post, Router};
use std::sync::Arc;

use crate::core::shared::state::AppState;

pub use credentials::{CredentialCheck, StaticPasswordCheck};
pub use error::AuthError;
pub use handlers::*;
pub use middleware::{require_admin, AdminToken};
pub use session::{AdminSession, SessionRegistry};

pub fn configure_login_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/admin/login", post(handle_login))
}

/// Needs the admin middleware in front of it to populate [`AdminToken`].
pub fn configure_logout_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/admin/logout", post(handle_logout))
}
