use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use super::chatwork::ChatworkError;

/// Why Chatwork refused to accept a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteErrorKind {
    InvalidCredential,
    Forbidden,
    RoomNotFound,
    RateLimited,
    Unavailable,
    Other,
}

impl RemoteErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::InvalidCredential,
            403 => Self::Forbidden,
            404 => Self::RoomNotFound,
            429 => Self::RateLimited,
            503 => Self::Unavailable,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredential => write!(f, "Chatwork API key is invalid"),
            Self::Forbidden => write!(f, "No permission to post to the Chatwork room"),
            Self::RoomNotFound => write!(f, "Chatwork room was not found"),
            Self::RateLimited => {
                write!(f, "Chatwork rate limit exceeded, wait a moment and try again")
            }
            Self::Unavailable => write!(f, "Chatwork is temporarily unavailable"),
            Self::Other => write!(f, "Failed to send the Chatwork message"),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum NotifyError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("No access to the specified Chatwork room {room_id}")]
    Access { room_id: String, status: u16 },
    #[error("{kind} ({status})")]
    Remote { kind: RemoteErrorKind, status: u16 },
    #[error("Connection to Chatwork timed out, check the network and try again")]
    Timeout,
    #[error("Could not reach Chatwork: {0}")]
    Transport(String),
    #[error("Failed to read {0}")]
    Storage(String),
    /// The message reached Chatwork but the visitor log was not written.
    #[error("Notification sent but the visitor log could not be saved: {0}")]
    Persistence(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NotifyError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Configuration(_) => "configuration",
            Self::NotFound(_) => "not_found",
            Self::Access { .. } => "access",
            Self::Remote { .. } => "remote",
            Self::Timeout => "timeout",
            Self::Transport(_) => "transport",
            Self::Storage(_) => "storage",
            Self::Persistence(_) => "persistence",
            Self::Internal(_) => "internal",
        }
    }

    /// True when the chat message was delivered despite the error.
    pub fn message_delivered(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    pub(crate) fn from_room_check(room_id: &str, e: ChatworkError) -> Self {
        match e {
            ChatworkError::Timeout => Self::Timeout,
            ChatworkError::Transport(msg) => Self::Transport(msg),
            ChatworkError::Status { status, .. } => Self::Access {
                room_id: room_id.to_string(),
                status,
            },
            ChatworkError::Decode(msg) => Self::Transport(msg),
        }
    }

    pub(crate) fn from_send(e: ChatworkError) -> Self {
        match e {
            ChatworkError::Timeout => Self::Timeout,
            ChatworkError::Transport(msg) | ChatworkError::Decode(msg) => Self::Transport(msg),
            ChatworkError::Status { status, .. } => Self::Remote {
                kind: RemoteErrorKind::from_status(status),
                status,
            },
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Access { .. } | Self::Remote { .. } | Self::Transport(_) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Storage(_) | Self::Persistence(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for NotifyError {
    fn into_response(self) -> axum::response::Response {
        let mut body = serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
            "delivered": self.message_delivered(),
        });
        if let Self::Remote { kind, status } = &self {
            body["remote_kind"] = serde_json::json!(kind);
            body["remote_status"] = serde_json::json!(status);
        }
        (self.status_code(), Json(body)).into_response()
    }
}
