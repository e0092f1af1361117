use axum::{extract::State, Json};
use log::error;
use std::sync::Arc;

use crate::core::shared::state::AppState;

use super::dispatcher::{DispatchReceipt, VisitRequest};
use super::error::NotifyError;

/// The dispatch runs on its own task so a client that disconnects mid-send
/// cannot cut it short before the visitor or error log is written.
pub async fn handle_create_visit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VisitRequest>,
) -> Result<Json<DispatchReceipt>, NotifyError> {
    let dispatcher = Arc::clone(&state.dispatcher);
    let receipt = tokio::spawn(async move { dispatcher.dispatch(&req).await })
        .await
        .map_err(|e| {
            error!("Visitor dispatch task failed: {}", e);
            NotifyError::Internal(e.to_string())
        })??;
    Ok(Json(receipt))
}
