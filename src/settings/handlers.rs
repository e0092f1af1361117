use axum::{extract::State, Json};
use log::info;
use std::sync::Arc;
use tokio::time::Instant;

use crate::core::config::MAX_CHATWORK_TIMEOUT;
use crate::core::shared::state::AppState;

use super::error::SettingsError;
use super::types::{
    ChatworkSettingsInput, ChatworkSettingsView, ConnectionTestResult, WalkinSettings,
    WalkinSettingsInput,
};

pub async fn handle_get_chatwork_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Option<ChatworkSettingsView>>, SettingsError> {
    let settings = state.settings.chatwork_settings().await?;
    Ok(Json(settings.as_ref().map(ChatworkSettingsView::from)))
}

pub async fn handle_save_chatwork_settings(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatworkSettingsInput>,
) -> Result<Json<ChatworkSettingsView>, SettingsError> {
    let saved = state
        .settings
        .save_chatwork_settings(req.validated()?)
        .await?;
    info!("Chatwork settings updated");
    Ok(Json(ChatworkSettingsView::from(&saved)))
}

pub async fn handle_get_walkin_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Option<WalkinSettings>>, SettingsError> {
    Ok(Json(state.settings.walkin_settings().await?))
}

pub async fn handle_save_walkin_settings(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WalkinSettingsInput>,
) -> Result<Json<WalkinSettings>, SettingsError> {
    let saved = state.settings.save_walkin_settings(req.validated()?).await?;
    info!("Walk-in settings updated, room {}", saved.chatwork_room_id);
    Ok(Json(saved))
}

fn chatwork_deadline(state: &AppState) -> Instant {
    Instant::now() + state.config.chatwork.timeout.min(MAX_CHATWORK_TIMEOUT)
}

async fn saved_api_key(state: &AppState) -> Result<String, SettingsError> {
    state
        .settings
        .chatwork_settings()
        .await?
        .map(|s| s.api_key)
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| SettingsError::NotConfigured("Chatwork API key is not set".to_string()))
}

/// Authenticates the saved API key against `GET /me`.
pub async fn handle_test_chatwork_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ConnectionTestResult>, SettingsError> {
    let api_key = saved_api_key(&state).await?;
    let deadline = chatwork_deadline(&state);
    let account = state
        .chatwork
        .me(api_key.trim(), deadline)
        .await
        .map_err(SettingsError::InvalidApiKey)?;
    Ok(Json(ConnectionTestResult {
        account_name: account.name,
        room_name: None,
    }))
}

/// Authenticates the saved API key, then checks it can read the walk-in room.
pub async fn handle_test_walkin_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ConnectionTestResult>, SettingsError> {
    let room_id = state
        .settings
        .walkin_settings()
        .await?
        .map(|s| s.chatwork_room_id)
        .filter(|room| !room.trim().is_empty())
        .ok_or_else(|| SettingsError::NotConfigured("walk-in room ID is not set".to_string()))?;
    let api_key = saved_api_key(&state).await?;

    let deadline = chatwork_deadline(&state);
    let account = state
        .chatwork
        .me(api_key.trim(), deadline)
        .await
        .map_err(SettingsError::InvalidApiKey)?;
    let room = state
        .chatwork
        .room(api_key.trim(), room_id.trim(), deadline)
        .await
        .map_err(SettingsError::RoomAccess)?;

    Ok(Json(ConnectionTestResult {
        account_name: account.name,
        room_name: Some(room.name),
    }))
}
