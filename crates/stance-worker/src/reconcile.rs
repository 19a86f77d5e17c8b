use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use stance_engine::Engine;

/// Background task that keeps cached source positions consistent.
///
/// Runs on an interval and recomputes every source's position from its
/// approved arguments, repairing values left stale by writes that bypassed
/// the transition hooks.
pub async fn run_reconcile_loop(engine: Arc<Engine>, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;

        match reconcile(engine.clone()).await {
            Ok(0) => debug!("Reconcile: source positions up to date"),
            Ok(count) => info!("Reconcile: repaired {} source positions", count),
            Err(e) => warn!("Reconcile error: {}", e),
        }
    }
}

async fn reconcile(engine: Arc<Engine>) -> anyhow::Result<usize> {
    // SQLite work is blocking
    let changed = tokio::task::spawn_blocking(move || engine.recompute_all_source_positions()).await??;
    Ok(changed)
}
