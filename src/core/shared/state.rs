use std::sync::Arc;

use crate::audit::storage::AuditLogStore;
use crate::auth::{CredentialCheck, SessionRegistry, StaticPasswordCheck};
use crate::core::config::AppConfig;
use crate::directory::storage::DirectoryStore;
use crate::notify::chatwork::ChatworkClient;
use crate::notify::dispatcher::NotificationDispatcher;
use crate::settings::storage::SettingsStore;

/// Shared handles passed to every handler as `State<Arc<AppState>>`.
pub struct AppState {
    pub config: AppConfig,
    pub directory: Arc<dyn DirectoryStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub audit: Arc<dyn AuditLogStore>,
    pub chatwork: ChatworkClient,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub sessions: SessionRegistry,
    pub credentials: Arc<dyn CredentialCheck>,
}

impl AppState {
    /// Wires the dispatcher, Chatwork client and admin gate from `config` around the given stores.
    pub fn new(
        config: AppConfig,
        directory: Arc<dyn DirectoryStore>,
        settings: Arc<dyn SettingsStore>,
        audit: Arc<dyn AuditLogStore>,
    ) -> Self {
        let chatwork = ChatworkClient::new(config.chatwork.api_base.clone());
        let dispatcher = Arc::new(NotificationDispatcher::new(
            Arc::clone(&directory),
            Arc::clone(&settings),
            Arc::clone(&audit),
            chatwork.clone(),
            config.chatwork.timeout,
        ));
        let sessions = SessionRegistry::new(config.admin.session_ttl);
        let credentials: Arc<dyn CredentialCheck> =
            Arc::new(StaticPasswordCheck::new(config.admin.password.clone()));

        Self {
            config,
            directory,
            settings,
            audit,
            chatwork,
            dispatcher,
            sessions,
            credentials,
        }
    }
}
