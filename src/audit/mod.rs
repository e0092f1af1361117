pub mod handlers;
pub mod storage;
pub mod types;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::core::shared::state::AppState;

pub use handlers::*;
pub use storage::{AuditLogStore, InMemoryAuditLogStore, PgAuditLogStore};
pub use types::*;

pub fn configure_audit_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/logs/visitors", get(handle_list_visitor_logs))
        .route("/api/admin/logs/errors", get(handle_list_error_logs))
}
