use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::config;
use crate::db::store::DocumentStore;

/// Spawn the periodic expiry sweep.
///
/// Expiry is enforced lazily at read and write time; this job removes the
/// expired rows themselves so they do not accumulate.
pub fn start_expiry_sweep(store: Arc<dyn DocumentStore>) -> tokio::task::JoinHandle<()> {
    let interval = Duration::from_secs(config::get_config().expiry_sweep_interval_secs);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;
            match store.sweep_expired().await {
                Ok(0) => {}
                Ok(removed) => info!("Cleaned up {} expired documents", removed),
                Err(e) => error!("Error cleaning up expired documents: {}", e),
            }
        }
    })
}
