use anyhow::Context;
use log::{error, info};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use visitdesk::api_router::configure_api_routes;
use visitdesk::audit::PgAuditLogStore;
use visitdesk::core::config::AppConfig;
use visitdesk::core::shared::state::AppState;
use visitdesk::core::shared::utils::{create_conn, run_migrations};
use visitdesk::directory::PgDirectoryStore;
use visitdesk::settings::PgSettingsStore;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received, stopping server");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .write_style(env_logger::WriteStyle::Always)
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    info!(
        "Starting visitdesk {} (Chatwork API {}, timeout {:?})",
        env!("CARGO_PKG_VERSION"),
        config.chatwork.api_base,
        config.chatwork.timeout
    );

    let pool = create_conn(&config.database).context("Failed to create database pool")?;
    run_migrations(&pool).map_err(|e| anyhow::anyhow!("Failed to run migrations: {e}"))?;
    info!("Database migrations applied");

    let bind_address = config.bind_address();
    let state = Arc::new(AppState::new(
        config,
        Arc::new(PgDirectoryStore::new(pool.clone())),
        Arc::new(PgSettingsStore::new(pool.clone())),
        Arc::new(PgAuditLogStore::new(pool)),
    ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = configure_api_routes(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = match tokio::net::TcpListener::bind(&bind_address).await {
        Ok(l) => l,
        Err(e) => {
            error!(
                "Failed to bind to {}: {} - is another instance running?",
                bind_address, e
            );
            return Err(e.into());
        }
    };
    info!("HTTP server listening on {}", bind_address);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}
