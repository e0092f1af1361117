use anyhow::{anyhow, Context};
use std::time::Duration;

pub const DEFAULT_CHATWORK_API_BASE: &str = "https://api.chatwork.com/v2";

/// Upper bound for one visitor's Chatwork calls (room check plus send).
pub const MAX_CHATWORK_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub chatwork: ChatworkConfig,
    pub admin: AdminConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone, Debug)]
pub struct ChatworkConfig {
    pub api_base: String,
    /// Budget shared by the room check and the message send of one dispatch.
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct AdminConfig {
    pub password: String,
    pub session_ttl: Duration,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("password", &"<redacted>")
            .field("session_ttl", &self.session_ttl)
            .finish()
    }
}

impl AppConfig {
    /// Loads `.env` (if present) and then reads the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_str = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let get_num = |key: &str, default: u64| -> anyhow::Result<u64> {
            match lookup(key).filter(|v| !v.trim().is_empty()) {
                Some(v) => v
                    .trim()
                    .parse()
                    .with_context(|| format!("{key} must be a positive integer, got {v:?}")),
                None => Ok(default),
            }
        };

        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("DATABASE_URL is not set"))?;
        let admin_password = lookup("ADMIN_PASSWORD")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow!("ADMIN_PASSWORD is not set"))?;

        let timeout_secs = get_num("CHATWORK_TIMEOUT_SECS", 30)?;
        if timeout_secs == 0 || timeout_secs > MAX_CHATWORK_TIMEOUT.as_secs() {
            return Err(anyhow!(
                "CHATWORK_TIMEOUT_SECS must be between 1 and {}, got {timeout_secs}",
                MAX_CHATWORK_TIMEOUT.as_secs()
            ));
        }

        let ttl_minutes = get_num("ADMIN_SESSION_TTL_MINUTES", 480)?;
        let session_ttl = ttl_minutes
            .checked_mul(60)
            .map(Duration::from_secs)
            .with_context(|| format!("ADMIN_SESSION_TTL_MINUTES out of range: {ttl_minutes}"))?;

        let port = get_num("SERVER_PORT", 8080)?;
        let port = u16::try_from(port).with_context(|| format!("SERVER_PORT out of range: {port}"))?;

        let max_connections = get_num("DATABASE_MAX_CONNECTIONS", 10)?;
        let max_connections = u32::try_from(max_connections)
            .with_context(|| format!("DATABASE_MAX_CONNECTIONS out of range: {max_connections}"))?;

        Ok(Self {
            server: ServerConfig {
                host: get_str("SERVER_HOST", "0.0.0.0"),
                port,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            chatwork: ChatworkConfig {
                api_base: get_str("CHATWORK_API_BASE", DEFAULT_CHATWORK_API_BASE)
                    .trim_end_matches('/')
                    .to_string(),
                timeout: Duration::from_secs(timeout_secs),
            },
            admin: AdminConfig {
                password: admin_password,
                session_ttl,
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
