mod config;

use std::net::SocketAddr;

use tally_api::AppStateInner;
use tally_db::Database;
use tracing::info;

use crate::config::{Config, StoreBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tally=debug,tally_api=debug,tally_db=debug,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    let db = open_store(&config.store)?;
    let state = AppStateInner::new(db);

    let app = tally_api::router(state.clone(), config.static_dir.as_deref());
    if let Some(dir) = &config.static_dir {
        info!("Serving static pages from {}", dir.display());
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Tally server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.db.close()?;
    Ok(())
}

fn open_store(backend: &StoreBackend) -> anyhow::Result<Database> {
    match backend {
        StoreBackend::File { path } => Database::open_json_file(path),
        StoreBackend::Redis { url, prefix } => Database::open_redis(url, prefix),
        StoreBackend::Sqlite { path } => Database::open_sqlite(path),
        StoreBackend::Memory => Ok(Database::in_memory()),
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
