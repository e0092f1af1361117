pub mod handlers;
pub mod storage;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::core::shared::state::AppState;

pub use handlers::*;
pub use storage::{DirectoryStore, InMemoryDirectoryStore, PgDirectoryStore};
pub use types::*;

/// Read-only routes used by the reception kiosk.
pub fn configure_kiosk_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/kiosk/companies", get(handle_list_companies))
        .route(
            "/api/kiosk/companies/:id/staff",
            get(handle_list_company_staff),
        )
}

pub fn configure_directory_admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/companies", get(handle_list_companies))
        .route("/api/admin/companies", post(handle_create_company))
        .route(
            "/api/admin/companies/:id",
            get(handle_get_company)
                .put(handle_update_company)
                .delete(handle_delete_company),
        )
        .route("/api/admin/staff", get(handle_list_staff))
        .route("/api/admin/staff", post(handle_create_staff))
        .route(
            "/api/admin/staff/:id",
            get(handle_get_staff)
                .put(handle_update_staff)
                .delete(handle_delete_staff),
        )
}
