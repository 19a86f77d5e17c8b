mod config;
mod reconcile;

use std::sync::Arc;

use tracing::{info, warn};

use stance_db::Database;
use stance_engine::Engine;

use crate::config::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stance_worker=debug,stance_engine=debug,stance_db=info".into()),
        )
        .init();

    let config = WorkerConfig::from_env()?;

    // Init database
    let db = Database::open(&config.db_path)?;
    let engine = Arc::new(Engine::new(db, config.engine.clone()));

    info!(
        "Stance worker started, reconciling every {}s (compatibility threshold {}, limit {})",
        config.reconcile_interval_secs,
        config.engine.compatibility_threshold,
        config.engine.compatibility_limit,
    );

    tokio::select! {
        _ = reconcile::run_reconcile_loop(engine, config.reconcile_interval_secs) => {}
        _ = shutdown_signal() => {}
    }

    info!("Stance worker stopped");
    Ok(())
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
                warn!("Failed to install SIGTERM handler: {}", e);
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
