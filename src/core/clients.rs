//! Process-wide backend client cache
//!
//! One connection handle is kept per backend family, and per location for
//! Vertex, shared by every in-flight request for the life of the process.
//! First use initializes the handle; the `DashMap` entry API serializes a
//! racing first-use so each key is initialized at most once. Handles are
//! never evicted or health-checked.

use crate::config::{OpenAiConfig, VertexConfig};
use crate::core::providers::{
    BackendFamily, CompletionBackend, OpenAiClient, ProviderHandle, VertexClient,
};
use crate::core::registry;
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Cache key: families are singletons except Vertex, which is keyed by
/// location because the regional endpoint differs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ClientKey {
    OpenAi,
    Vertex(String),
}

/// Lazily-initialized, keyed cache of backend handles
pub struct ClientCache {
    openai: OpenAiConfig,
    vertex: VertexConfig,
    handles: DashMap<ClientKey, Arc<ProviderHandle>>,
}

impl ClientCache {
    /// Create an empty cache. No connections are opened until first use.
    pub fn new(openai: OpenAiConfig, vertex: VertexConfig) -> Self {
        Self {
            openai,
            vertex,
            handles: DashMap::new(),
        }
    }

    /// Get the handle for `family`, initializing it on first use.
    ///
    /// `location` only participates in the key for location-sensitive
    /// families. Initialization failures (missing credentials, missing
    /// project id) surface as [`GatewayError::ClientInit`].
    pub fn get(&self, family: BackendFamily, location: &str) -> Result<Arc<ProviderHandle>> {
        let key = match family {
            BackendFamily::OpenAi => ClientKey::OpenAi,
            BackendFamily::Vertex => ClientKey::Vertex(location.to_string()),
        };

        // Vacant entry holds the shard lock through initialization, so two
        // requests racing on the same key produce exactly one handle.
        match self.handles.entry(key) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                debug!(family = %family, location, "initializing backend client");
                let handle = match family {
                    BackendFamily::OpenAi => {
                        ProviderHandle::OpenAi(OpenAiClient::new(&self.openai)?)
                    }
                    BackendFamily::Vertex => {
                        ProviderHandle::Vertex(VertexClient::new(&self.vertex, location)?)
                    }
                };
                let inserted = entry.insert(Arc::new(handle));
                Ok(Arc::clone(&inserted))
            }
        }
    }

    /// Number of initialized handles (diagnostics only)
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether any handle has been initialized yet
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl std::fmt::Debug for ClientCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCache")
            .field("handle_count", &self.handles.len())
            .finish()
    }
}

/// Production [`CompletionBackend`]: routes each model to its backend
/// family's cached handle, using the request's routing location.
#[derive(Debug, Clone)]
pub struct RoutedBackend {
    cache: Arc<ClientCache>,
    location: String,
}

impl RoutedBackend {
    /// Bind a backend view to one request's routing location.
    pub fn new(cache: Arc<ClientCache>, location: impl Into<String>) -> Self {
        Self {
            cache,
            location: location.into(),
        }
    }
}

#[async_trait]
impl CompletionBackend for RoutedBackend {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String> {
        let family = registry::backend_for(model).ok_or_else(|| {
            GatewayError::validation(format!("Model {} is not registered", model))
        })?;
        let handle = self.cache.get(family, &self.location)?;
        handle.complete(model, prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cache() -> Arc<ClientCache> {
        let openai = OpenAiConfig {
            api_key: Some("sk-test".to_string()),
            ..OpenAiConfig::default()
        };
        let vertex = VertexConfig {
            project_id: Some("test-project".to_string()),
            ..VertexConfig::default()
        };
        Arc::new(ClientCache::new(openai, vertex))
    }

    #[test]
    fn test_same_key_returns_same_handle() {
        let cache = test_cache();
        let a = cache.get(BackendFamily::OpenAi, "us-central1").unwrap();
        let b = cache.get(BackendFamily::OpenAi, "europe-west4").unwrap();
        // OpenAI ignores the location: one singleton
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_vertex_keyed_by_location() {
        let cache = test_cache();
        let us = cache.get(BackendFamily::Vertex, "us-central1").unwrap();
        let eu = cache.get(BackendFamily::Vertex, "europe-west4").unwrap();
        let us_again = cache.get(BackendFamily::Vertex, "us-central1").unwrap();
        assert!(!Arc::ptr_eq(&us, &eu));
        assert!(Arc::ptr_eq(&us, &us_again));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_missing_credentials_is_client_init_error() {
        let cache = ClientCache::new(OpenAiConfig::default(), VertexConfig::default());
        assert!(matches!(
            cache.get(BackendFamily::OpenAi, "us-central1"),
            Err(GatewayError::ClientInit(_))
        ));
        assert!(matches!(
            cache.get(BackendFamily::Vertex, "us-central1"),
            Err(GatewayError::ClientInit(_))
        ));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_first_use_initializes_once() {
        let cache = test_cache();
        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.get(BackendFamily::Vertex, "us-central1").unwrap() })
            })
            .collect();

        let mut handles = Vec::new();
        for task in tasks {
            handles.push(task.await.unwrap());
        }
        for handle in &handles[1..] {
            assert!(Arc::ptr_eq(&handles[0], handle));
        }
        assert_eq!(cache.len(), 1);
    }
}
