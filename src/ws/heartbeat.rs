use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::config;
use crate::ws::registry::SessionRegistry;

/// Spawn the connection liveness task.
///
/// Every `heartbeat_interval_secs` it pings all connected clients and
/// closes any connection that has been silent for longer than
/// `client_timeout_secs`. With the defaults (30s / 75s) a half-open
/// connection and its stale room membership are gone within at most
/// one timeout plus one tick.
pub fn start_heartbeat(registry: Arc<SessionRegistry>) -> tokio::task::JoinHandle<()> {
    let config = config::get_config();
    let interval = Duration::from_secs(config.heartbeat_interval_secs);
    let max_idle = Duration::from_secs(config.client_timeout_secs);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;
            registry.ping_all().await;
            let reaped = registry.reap_idle(max_idle).await;
            if reaped > 0 {
                info!(reaped, "Closed idle WebSocket connections");
            }
            let count = registry.connection_count().await;
            debug!(count, "WebSocket heartbeat ping");
        }
    })
}
