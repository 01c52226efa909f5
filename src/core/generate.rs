//! Concurrent response generation
//!
//! Fans one prompt out to every resolved model and joins on the whole
//! batch. Each call gets its own hard deadline; a timeout or backend error
//! marks that model's slot as failed without disturbing sibling calls. The
//! output is index-aligned with the input list so model/text pairing never
//! depends on completion order.

use crate::core::providers::CompletionBackend;
use futures::future::join_all;
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

/// One model's generation outcome. Failure is recorded as `text: None`,
/// not dropped, so the sequence stays positional with the resolved list.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateResponse {
    /// Model that was asked
    pub model: String,
    /// Generated text, absent when the call failed or timed out
    pub text: Option<String>,
}

/// Ask every model for a completion of `prompt`, concurrently.
///
/// Returns one [`CandidateResponse`] per input model, in input order. The
/// batch completes only when every call has produced a result, failed, or
/// hit `call_timeout`.
pub async fn generate<B>(
    backend: &B,
    models: &[String],
    prompt: &str,
    call_timeout: Duration,
) -> Vec<CandidateResponse>
where
    B: CompletionBackend + ?Sized,
{
    let calls = models.iter().map(|model| async move {
        match timeout(call_timeout, backend.complete(model, prompt)).await {
            Ok(Ok(text)) => Some(text),
            Ok(Err(e)) => {
                warn!(model = %model, error = %e, "generation call failed");
                None
            }
            Err(_) => {
                warn!(model = %model, timeout_secs = call_timeout.as_secs(), "generation call timed out");
                None
            }
        }
    });

    // join_all preserves input order, which is what keeps model <-> text
    // pairing stable regardless of which call finishes first.
    let texts = join_all(calls).await;

    models
        .iter()
        .zip(texts)
        .map(|(model, text)| CandidateResponse {
            model: model.clone(),
            text,
        })
        .collect()
}
