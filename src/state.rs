use std::sync::Arc;

use crate::db::store::DocumentStore;
use crate::ws::registry::SessionRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub registry: Arc<SessionRegistry>,
}
