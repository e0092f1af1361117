pub mod api_router;
pub mod audit;
pub mod auth;
pub mod core;
pub mod directory;
pub mod notify;
pub mod settings;

pub use crate::core::config::AppConfig;
pub use crate::core::shared::state::AppState;
