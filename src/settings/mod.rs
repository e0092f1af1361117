pub mod error;
pub mod handlers;
pub mod storage;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::core::shared::state::AppState;

pub use error::SettingsError;
pub use handlers::*;
pub use storage::{InMemorySettingsStore, PgSettingsStore, SettingsStore};
pub use types::*;

pub fn configure_settings_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/admin/settings/chatwork",
            get(handle_get_chatwork_settings).put(handle_save_chatwork_settings),
        )
        .route(
            "/api/admin/settings/chatwork/test",
            post(handle_test_chatwork_settings),
        )
        .route(
            "/api/admin/settings/walkin",
            get(handle_get_walkin_settings).put(handle_save_walkin_settings),
        )
        .route(
            "/api/admin/settings/walkin/test",
            post(handle_test_walkin_settings),
        )
}
