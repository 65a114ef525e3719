mod api;
mod config;
mod db;
mod error;
mod feed;
mod models;
mod processor;
mod scheduler;
mod store;

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

use config::AppConfig;
use feed::FeedClient;
use scheduler::WarningUpdater;
use store::WarningStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    info!("Starting warnfeed service...");

    // Init DB
    let pool = db::init_pool(&config.database_url).await?;
    info!("Connected to database");
    db::run_migrations(&pool).await?;
    info!("Database migrations applied");

    let store = WarningStore::new(pool, config.retention_days);
    let feed = FeedClient::new(&config.feed_url, config.feed_timeout_secs)?;
    let updater = Arc::new(WarningUpdater::new(
        feed,
        store.clone(),
        Duration::from_secs(config.update_interval_secs),
    ));

    // Background updater, cancelled between cycles at shutdown.
    let cancel = CancellationToken::new();
    let updater_task = tokio::spawn({
        let updater = Arc::clone(&updater);
        let cancel = cancel.clone();
        async move { updater.run(cancel).await }
    });

    let state = api::AppState { store, updater };
    let app = api::build_router(state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("Listening on {}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel.cancel();
    let _ = updater_task.await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
