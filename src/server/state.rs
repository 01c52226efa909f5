//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::core::ClientCache;
use std::sync::Arc;

/// HTTP server state shared across handlers.
///
/// The client cache is the only resource shared between concurrent
/// requests; everything else a request touches is request-local.
#[derive(Clone)]
pub struct AppState {
    /// Gateway configuration (shared read-only)
    pub config: Arc<Config>,
    /// Process-wide backend client cache
    pub clients: Arc<ClientCache>,
}

impl AppState {
    /// Create a new AppState with shared resources
    pub fn new(config: Config) -> Self {
        let clients = ClientCache::new(config.openai.clone(), config.vertex.clone());
        Self {
            config: Arc::new(config),
            clients: Arc::new(clients),
        }
    }
}
