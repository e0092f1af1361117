use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct AdminSession {
    pub token: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Bearer tokens handed out after a successful admin login.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, DateTime<Utc>>>>,
    ttl: chrono::Duration,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36_500)),
        }
    }

    pub async fn issue(&self) -> AdminSession {
        let now = Utc::now();
        let session = AdminSession {
            token: Uuid::new_v4(),
            expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, expires_at| *expires_at > now);
        sessions.insert(session.token, session.expires_at);
        session
    }

    /// True while the token exists and has not expired. Expired tokens are dropped.
    pub async fn validate(&self, token: Uuid) -> bool {
        let now = Utc::now();
        let expires_at = self.sessions.read().await.get(&token).copied();
        match expires_at {
            Some(expires_at) if expires_at > now => true,
            Some(_) => {
                self.sessions.write().await.remove(&token);
                false
            }
            None => false,
        }
    }

    pub async fn revoke(&self, token: Uuid) -> bool {
        self.sessions.write().await.remove(&token).is_some()
    }
}
