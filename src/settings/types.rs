use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::shared::error::{StoreError, StoreResult};
use crate::core::shared::schema::{chatwork_settings, walkin_settings};
use crate::core::shared::utils::{mask_secret, non_blank};

#[derive(Clone, PartialEq, Eq, Queryable, Insertable)]
#[diesel(table_name = chatwork_settings)]
pub struct ChatworkSettings {
    pub id: Uuid,
    pub api_key: String,
    pub message_template: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for ChatworkSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatworkSettings")
            .field("id", &self.id)
            .field("api_key", &mask_secret(&self.api_key))
            .field("message_template", &self.message_template)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = walkin_settings)]
pub struct WalkinSettings {
    pub id: Uuid,
    pub chatwork_room_id: String,
    pub message_template: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin-facing view of [`ChatworkSettings`]; the API key never leaves the server unmasked.
#[derive(Debug, Clone, Serialize)]
pub struct ChatworkSettingsView {
    pub id: Uuid,
    pub api_key_masked: String,
    pub message_template: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ChatworkSettings> for ChatworkSettingsView {
    fn from(settings: &ChatworkSettings) -> Self {
        Self {
            id: settings.id,
            api_key_masked: mask_secret(&settings.api_key),
            message_template: settings.message_template.clone(),
            created_at: settings.created_at,
            updated_at: settings.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatworkSettingsInput {
    pub api_key: String,
    pub message_template: String,
}

impl ChatworkSettingsInput {
    pub fn validated(self) -> StoreResult<Self> {
        let api_key = non_blank(Some(self.api_key.as_str())).map(str::to_string);
        match api_key {
            Some(api_key) if !self.message_template.trim().is_empty() => Ok(Self {
                api_key,
                message_template: self.message_template,
            }),
            _ => Err(StoreError::Validation(
                "api_key and message_template are required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalkinSettingsInput {
    pub chatwork_room_id: String,
    pub message_template: String,
}

impl WalkinSettingsInput {
    pub fn validated(self) -> StoreResult<Self> {
        let room = non_blank(Some(self.chatwork_room_id.as_str())).map(str::to_string);
        match room {
            Some(chatwork_room_id) if !self.message_template.trim().is_empty() => Ok(Self {
                chatwork_room_id,
                message_template: self.message_template,
            }),
            _ => Err(StoreError::Validation(
                "chatwork_room_id and message_template are required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionTestResult {
    pub account_name: String,
    pub room_name: Option<String>,
}
