pub mod chatwork;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod template;

use axum::{routing::post, Router};
use std::sync::Arc;

use crate::core::shared::state::AppState;

pub use chatwork::{ChatworkClient, ChatworkError};
pub use dispatcher::{DispatchPath, DispatchReceipt, NotificationDispatcher, VisitRequest};
pub use error::{NotifyError, RemoteErrorKind};
pub use handlers::*;

pub fn configure_visit_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/visits", post(handle_create_visit))
}
