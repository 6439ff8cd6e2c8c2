use std::sync::Arc;

use anyhow::Result;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use device_readings_service::{
    api,
    config::Config,
    db,
    readings::ReadingService,
    store::{MemoryReadingStore, PgReadingStore, SharedStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env; env vars may also be set externally
    let _ = dotenvy::dotenv();

    // Initialise tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Load config
    let config = Config::from_env()?;

    let store: SharedStore = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url, config.db_pool_max).await?;
            db::run_migrations(&pool).await?;
            info!(
                database_url = %config.masked_database_url().unwrap_or_default(),
                pool_max = config.db_pool_max,
                "Database ready"
            );
            Arc::new(PgReadingStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; readings are kept in memory and lost on exit");
            Arc::new(MemoryReadingStore::new())
        }
    };

    let service = ReadingService::new(store);

    // Start HTTP server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, api::router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
