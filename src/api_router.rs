//! Combines the kiosk, admin and health routes into one router.

use axum::{middleware, routing::get, Json, Router};
use std::sync::Arc;

use crate::core::shared::state::AppState;

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Every `/api/admin/*` route except login sits behind [`crate::auth::require_admin`].
pub fn configure_api_routes(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .merge(crate::directory::configure_directory_admin_routes())
        .merge(crate::settings::configure_settings_routes())
        .merge(crate::audit::configure_audit_routes())
        .merge(crate::auth::configure_logout_routes())
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            crate::auth::require_admin,
        ));

    Router::new()
        .route("/health", get(handle_health))
        .merge(crate::directory::configure_kiosk_routes())
        .merge(crate::notify::configure_visit_routes())
        .merge(crate::auth::configure_login_routes())
        .merge(admin)
        .with_state(state)
}
