use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::core::shared::error::StoreResult;
use crate::core::shared::state::AppState;

use super::types::{ErrorLog, LogQuery, VisitorLogEntry};

pub async fn handle_list_visitor_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogQuery>,
) -> StoreResult<Json<Vec<VisitorLogEntry>>> {
    let logs = state
        .audit
        .list_visitor_logs(query.effective_limit())
        .await?;
    Ok(Json(logs))
}

pub async fn handle_list_error_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogQuery>,
) -> StoreResult<Json<Vec<ErrorLog>>> {
    Ok(Json(
        state.audit.list_error_logs(query.effective_limit()).await?,
    ))
}
