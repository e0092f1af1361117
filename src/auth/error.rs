use axum::{
    http::{header::WWW_AUTHENTICATE, StatusCode},
    response::IntoResponse,
    Json,
};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid password")]
    InvalidCredentials,
    #[error("Missing authorization token")]
    MissingToken,
    #[error("Invalid authorization format")]
    InvalidFormat,
    #[error("Session is invalid or has expired")]
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::UNAUTHORIZED,
            [(WWW_AUTHENTICATE, "Bearer")],
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
