//! Supported-model registry and model selection
//!
//! The registry is the single source of truth for which models the gateway
//! can query and which backend family serves each of them. It is immutable
//! and process-wide; definition order here is the order used when a caller
//! does not pick models explicitly.

use crate::core::providers::BackendFamily;
use crate::utils::error::{GatewayError, Result};

/// Registered models, in definition order
pub const SUPPORTED_MODELS: &[(&str, BackendFamily)] = &[
    ("gemini-2.0-flash", BackendFamily::Vertex),
    ("gemini-1.5-flash", BackendFamily::Vertex),
    ("gemini-2.0-flash-001", BackendFamily::Vertex),
    ("gpt-4", BackendFamily::OpenAi),
];

/// Whether the registry knows the given model
pub fn is_supported(model: &str) -> bool {
    SUPPORTED_MODELS.iter().any(|(name, _)| *name == model)
}

/// Backend family serving the given model, if registered
pub fn backend_for(model: &str) -> Option<BackendFamily> {
    SUPPORTED_MODELS
        .iter()
        .find(|(name, _)| *name == model)
        .map(|(_, family)| *family)
}

/// All registered model ids, in registry-definition order
pub fn all_models() -> Vec<String> {
    SUPPORTED_MODELS
        .iter()
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Determine the list of models to query, prioritizing user selections.
///
/// User-specified models are filtered against the registry, preserving the
/// caller's order and any duplicates (duplicate entries make duplicate
/// concurrent calls, which callers use for ensemble-by-repetition). If the
/// filter leaves nothing, the request is rejected. With no selection at all,
/// every registered model is queried.
pub fn resolve(requested: Option<&[String]>) -> Result<Vec<String>> {
    match requested {
        Some(models) if !models.is_empty() => {
            let valid: Vec<String> = models
                .iter()
                .filter(|m| is_supported(m))
                .cloned()
                .collect();

            if valid.is_empty() {
                return Err(GatewayError::ModelSelection {
                    requested: models.to_vec(),
                });
            }
            Ok(valid)
        }
        _ => Ok(all_models()),
    }
}
