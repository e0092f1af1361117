use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::shared::error::StoreResult;
use crate::core::shared::schema::{chatwork_settings, walkin_settings};
use crate::core::shared::utils::{with_conn, DbPool};

use super::types::{ChatworkSettings, ChatworkSettingsInput, WalkinSettings, WalkinSettingsInput};

/// Both settings tables hold zero or one row. `None` means "not configured", never an error.
/// Concurrent saves serialize, so the first save of two racing callers creates the row
/// and the second updates it.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn chatwork_settings(&self) -> StoreResult<Option<ChatworkSettings>>;
    async fn save_chatwork_settings(&self, input: ChatworkSettingsInput)
        -> StoreResult<ChatworkSettings>;
    async fn walkin_settings(&self) -> StoreResult<Option<WalkinSettings>>;
    async fn save_walkin_settings(&self, input: WalkinSettingsInput) -> StoreResult<WalkinSettings>;
}

pub struct PgSettingsStore {
    pool: DbPool,
}

impl PgSettingsStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for PgSettingsStore {
    async fn chatwork_settings(&self) -> StoreResult<Option<ChatworkSettings>> {
        with_conn(&self.pool, |conn| {
            Ok(chatwork_settings::table
                .order(chatwork_settings::created_at.asc())
                .first::<ChatworkSettings>(conn)
                .optional()?)
        })
        .await
    }

    async fn save_chatwork_settings(
        &self,
        input: ChatworkSettingsInput,
    ) -> StoreResult<ChatworkSettings> {
        with_conn(&self.pool, move |conn| {
            conn.transaction(|conn| {
                diesel::sql_query("LOCK TABLE chatwork_settings IN EXCLUSIVE MODE").execute(conn)?;
                let now = Utc::now();
                let existing: Option<Uuid> = chatwork_settings::table
                    .order(chatwork_settings::created_at.asc())
                    .select(chatwork_settings::id)
                    .first(conn)
                    .optional()?;
                let saved = match existing {
                    Some(id) => diesel::update(chatwork_settings::table.find(id))
                        .set((
                            chatwork_settings::api_key.eq(input.api_key),
                            chatwork_settings::message_template.eq(input.message_template),
                            chatwork_settings::updated_at.eq(now),
                        ))
                        .get_result::<ChatworkSettings>(conn)?,
                    None => {
                        let row = ChatworkSettings {
                            id: Uuid::new_v4(),
                            api_key: input.api_key,
                            message_template: input.message_template,
                            created_at: now,
                            updated_at: now,
                        };
                        diesel::insert_into(chatwork_settings::table)
                            .values(&row)
                            .execute(conn)?;
                        row
                    }
                };
                Ok(saved)
            })
        })
        .await
    }

    async fn walkin_settings(&self) -> StoreResult<Option<WalkinSettings>> {
        with_conn(&self.pool, |conn| {
            Ok(walkin_settings::table
                .order(walkin_settings::created_at.asc())
                .first::<WalkinSettings>(conn)
                .optional()?)
        })
        .await
    }

    async fn save_walkin_settings(&self, input: WalkinSettingsInput) -> StoreResult<WalkinSettings> {
        with_conn(&self.pool, move |conn| {
            conn.transaction(|conn| {
                diesel::sql_query("LOCK TABLE walkin_settings IN EXCLUSIVE MODE").execute(conn)?;
                let now = Utc::now();
                let existing: Option<Uuid> = walkin_settings::table
                    .order(walkin_settings::created_at.asc())
                    .select(walkin_settings::id)
                    .first(conn)
                    .optional()?;
                let saved = match existing {
                    Some(id) => diesel::update(walkin_settings::table.find(id))
                        .set((
                            walkin_settings::chatwork_room_id.eq(input.chatwork_room_id),
                            walkin_settings::message_template.eq(input.message_template),
                            walkin_settings::updated_at.eq(now),
                        ))
                        .get_result::<WalkinSettings>(conn)?,
                    None => {
                        let row = WalkinSettings {
                            id: Uuid::new_v4(),
                            chatwork_room_id: input.chatwork_room_id,
                            message_template: input.message_template,
                            created_at: now,
                            updated_at: now,
                        };
                        diesel::insert_into(walkin_settings::table)
                            .values(&row)
                            .execute(conn)?;
                        row
                    }
                };
                Ok(saved)
            })
        })
        .await
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySettingsStore {
    chatwork: Arc<RwLock<Option<ChatworkSettings>>>,
    walkin: Arc<RwLock<Option<WalkinSettings>>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn chatwork_settings(&self) -> StoreResult<Option<ChatworkSettings>> {
        Ok(self.chatwork.read().await.clone())
    }

    async fn save_chatwork_settings(
        &self,
        input: ChatworkSettingsInput,
    ) -> StoreResult<ChatworkSettings> {
        let mut slot = self.chatwork.write().await;
        let now = Utc::now();
        let saved = match slot.take() {
            Some(existing) => ChatworkSettings {
                api_key: input.api_key,
                message_template: input.message_template,
                updated_at: now,
                ..existing
            },
            None => ChatworkSettings {
                id: Uuid::new_v4(),
                api_key: input.api_key,
                message_template: input.message_template,
                created_at: now,
                updated_at: now,
            },
        };
        *slot = Some(saved.clone());
        Ok(saved)
    }

    async fn walkin_settings(&self) -> StoreResult<Option<WalkinSettings>> {
        Ok(self.walkin.read().await.clone())
    }

    async fn save_walkin_settings(&self, input: WalkinSettingsInput) -> StoreResult<WalkinSettings> {
        let mut slot = self.walkin.write().await;
        let now = Utc::now();
        let saved = match slot.take() {
            Some(existing) => WalkinSettings {
                chatwork_room_id: input.chatwork_room_id,
                message_template: input.message_template,
                updated_at: now,
                ..existing
            },
            None => WalkinSettings {
                id: Uuid::new_v4(),
                chatwork_room_id: input.chatwork_room_id,
                message_template: input.message_template,
                created_at: now,
                updated_at: now,
            },
        };
        *slot = Some(saved.clone());
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_absent_settings_are_none() {
        let store = InMemorySettingsStore::new();
        assert!(store.chatwork_settings().await.expect("read").is_none());
        assert!(store.walkin_settings().await.expect("read").is_none());
    }

    #[tokio::test]
    async fn test_save_keeps_single_row() {
        let store = InMemorySettingsStore::new();
        let first = store
            .save_walkin_settings(WalkinSettingsInput {
                chatwork_room_id: "R1".to_string(),
                message_template: "a".to_string(),
            })
            .await
            .expect("save");
        let second = store
            .save_walkin_settings(WalkinSettingsInput {
                chatwork_room_id: "R2".to_string(),
                message_template: "b".to_string(),
            })
            .await
            .expect("save");

        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        let current = store.walkin_settings().await.expect("read").expect("present");
        assert_eq!(current.chatwork_room_id, "R2");
    }

    #[tokio::test]
    async fn test_chatwork_upsert() {
        let store = InMemorySettingsStore::new();
        store
            .save_chatwork_settings(ChatworkSettingsInput {
                api_key: "K1".to_string(),
                message_template: "t".to_string(),
            })
            .await
            .expect("save");
        let updated = store
            .save_chatwork_settings(ChatworkSettingsInput {
                api_key: "K2".to_string(),
                message_template: "t2".to_string(),
            })
            .await
            .expect("save");
        assert_eq!(updated.api_key, "K2");
        assert_eq!(
            store.chatwork_settings().await.expect("read").map(|s| s.message_template),
            Some("t2".to_string())
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_saves_share_one_row() {
        let store = InMemorySettingsStore::new();
        let save = |room: &str| {
            let store = store.clone();
            let input = WalkinSettingsInput {
                chatwork_room_id: room.to_string(),
                message_template: "t".to_string(),
            };
            tokio::spawn(async move { store.save_walkin_settings(input).await })
        };

        let (a, b) = tokio::join!(save("R1"), save("R2"));
        let a = a.expect("join").expect("save");
        let b = b.expect("join").expect("save");

        assert_eq!(a.id, b.id);
        let current = store.walkin_settings().await.expect("read").expect("present");
        assert_eq!(current.id, a.id);
    }
}
