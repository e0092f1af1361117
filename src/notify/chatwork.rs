use log::debug;
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

const TOKEN_HEADER: &str = "X-ChatWorkToken";

#[derive(Debug, thiserror::Error)]
pub enum ChatworkError {
    #[error("Chatwork returned HTTP {status}")]
    Status { status: u16, body: String },
    #[error("Chatwork request timed out")]
    Timeout,
    #[error("Chatwork request failed: {0}")]
    Transport(String),
    #[error("Unexpected Chatwork response: {0}")]
    Decode(String),
}

impl ChatworkError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(e.to_string())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub account_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub room_id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct PostedMessage {
    message_id: Option<serde_json::Value>,
}

/// Thin client for the Chatwork v2 REST API.
///
/// Every call takes a deadline instead of a per-request timeout so that several
/// calls made on behalf of one visitor share a single time budget.
#[derive(Debug, Clone)]
pub struct ChatworkClient {
    client: reqwest::Client,
    base_url: String,
}

impl ChatworkClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn room_url(&self, room_id: &str) -> String {
        format!("{}/rooms/{}", self.base_url, urlencoding::encode(room_id))
    }

    pub async fn me(&self, token: &str, deadline: Instant) -> Result<Account, ChatworkError> {
        let request = self
            .client
            .get(format!("{}/me", self.base_url))
            .header(TOKEN_HEADER, token);
        let body = self.execute(request, deadline).await?;
        serde_json::from_str(&body).map_err(|e| ChatworkError::Decode(e.to_string()))
    }

    pub async fn room(
        &self,
        token: &str,
        room_id: &str,
        deadline: Instant,
    ) -> Result<Room, ChatworkError> {
        let request = self.client.get(self.room_url(room_id)).header(TOKEN_HEADER, token);
        let body = self.execute(request, deadline).await?;
        serde_json::from_str(&body).map_err(|e| ChatworkError::Decode(e.to_string()))
    }

    /// Checks that the token can read the room. Only the status code matters.
    pub async fn check_room(
        &self,
        token: &str,
        room_id: &str,
        deadline: Instant,
    ) -> Result<(), ChatworkError> {
        let request = self.client.get(self.room_url(room_id)).header(TOKEN_HEADER, token);
        self.execute(request, deadline).await.map(|_| ())
    }

    /// Posts `body` to the room and returns the message id when Chatwork reports one.
    pub async fn post_message(
        &self,
        token: &str,
        room_id: &str,
        body: &str,
        deadline: Instant,
    ) -> Result<Option<String>, ChatworkError> {
        let request = self
            .client
            .post(format!("{}/messages", self.room_url(room_id)))
            .header(TOKEN_HEADER, token)
            .form(&[("body", body)]);
        let response = self.execute(request, deadline).await?;

        let message_id = serde_json::from_str::<PostedMessage>(&response)
            .ok()
            .and_then(|m| m.message_id)
            .map(|id| match id {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            });
        Ok(message_id)
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        deadline: Instant,
    ) -> Result<String, ChatworkError> {
        let exchange = async {
            let response = request.send().await.map_err(ChatworkError::from_reqwest)?;
            let status = response.status();
            let body = response.text().await.map_err(ChatworkError::from_reqwest)?;
            Ok::<(StatusCode, String), ChatworkError>((status, body))
        };

        let (status, body) = tokio::time::timeout_at(deadline, exchange)
            .await
            .map_err(|_| ChatworkError::Timeout)??;

        if !status.is_success() {
            debug!("Chatwork responded {} with {} bytes", status, body.len());
            return Err(ChatworkError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}
