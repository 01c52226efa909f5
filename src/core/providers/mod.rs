//! Backend provider implementations
//!
//! Each supported model is served by one backend family. Families are a
//! small closed set, so providers are modeled as an enum rather than boxed
//! trait objects; the [`CompletionBackend`] trait is the seam the
//! orchestrator sees, which lets tests substitute deterministic stubs.

pub mod openai;
pub mod vertex;

pub use openai::OpenAiClient;
pub use vertex::VertexClient;

use crate::utils::error::Result;
use async_trait::async_trait;

/// Backend family a model belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendFamily {
    /// Google Vertex AI; connections are location-sensitive
    Vertex,
    /// OpenAI; one process-wide connection
    OpenAi,
}

impl BackendFamily {
    /// Stable name used in logs and cache keys
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendFamily::Vertex => "vertex",
            BackendFamily::OpenAi => "openai",
        }
    }
}

impl std::fmt::Display for BackendFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that can turn (model, prompt) into completion text.
///
/// Production uses [`crate::core::clients::RoutedBackend`]; tests use stubs.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Ask `model` for a completion of `prompt`.
    async fn complete(&self, model: &str, prompt: &str) -> Result<String>;
}

/// An opened connection to one backend family.
///
/// Handles are owned by the process-wide client cache and borrowed by
/// requests; they are never closed or refreshed.
#[derive(Debug)]
pub enum ProviderHandle {
    /// Vertex AI handle, bound to one location
    Vertex(VertexClient),
    /// OpenAI handle, process-wide singleton
    OpenAi(OpenAiClient),
}

#[async_trait]
impl CompletionBackend for ProviderHandle {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String> {
        match self {
            ProviderHandle::Vertex(client) => client.complete(model, prompt).await,
            ProviderHandle::OpenAi(client) => client.complete(model, prompt).await,
        }
    }
}
