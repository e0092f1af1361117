use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::core::shared::error::StoreError;
use crate::notify::chatwork::ChatworkError;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    NotConfigured(String),
    #[error("Chatwork API key check failed: {0}")]
    InvalidApiKey(ChatworkError),
    #[error("No access to the specified Chatwork room: {0}")]
    RoomAccess(ChatworkError),
}

impl IntoResponse for SettingsError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            Self::Store(_) => None,
            Self::NotConfigured(_) => Some(StatusCode::BAD_REQUEST),
            Self::InvalidApiKey(ChatworkError::Timeout)
            | Self::RoomAccess(ChatworkError::Timeout) => Some(StatusCode::GATEWAY_TIMEOUT),
            Self::InvalidApiKey(_) | Self::RoomAccess(_) => Some(StatusCode::BAD_GATEWAY),
        };
        match (self, status) {
            (Self::Store(e), _) => e.into_response(),
            (other, status) => (
                status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                Json(serde_json::json!({ "error": other.to_string() })),
            )
                .into_response(),
        }
    }
}
