//! Request orchestration
//!
//! The end-to-end pipeline for one prompt: resolve the model list, fan the
//! prompt out to every model, judge each surviving response, and pick the
//! best-scoring candidate. Two sequential phases (generate, then evaluate)
//! each fan out to N independent tasks and join on all of them; the second
//! phase starts only once the first has settled because the judge needs the
//! generated text.

use crate::config::TimeoutConfig;
use crate::core::generate::{generate, CandidateResponse};
use crate::core::judge::{Judge, Verdict};
use crate::core::providers::CompletionBackend;
use crate::core::registry;
use crate::utils::error::{GatewayError, Result};
use futures::future::join_all;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// One candidate that survived both generation and evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedCandidate {
    /// Model that produced the response
    pub model: String,
    /// The generated response text
    pub text: String,
    /// Judge score in [0, 1]
    pub score: f64,
    /// Judge rationale
    pub reason: String,
}

/// Final result for one gateway request
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResult {
    /// The maximum-scoring candidate
    pub best: EvaluatedCandidate,
    /// Every candidate that survived generation and evaluation, in
    /// resolved-model order
    pub all_evaluated: Vec<EvaluatedCandidate>,
}

/// Run the full pipeline for one prompt.
///
/// Failures local to one model or one judge call are swallowed and logged;
/// only an empty surviving set ([`GatewayError::NoViableCandidate`]) or an
/// unusable model selection propagate.
pub async fn run<B, J>(
    backend: &B,
    judge: &J,
    requested_models: Option<&[String]>,
    prompt: &str,
    timeouts: &TimeoutConfig,
) -> Result<GatewayResult>
where
    B: CompletionBackend + ?Sized,
    J: Judge + ?Sized,
{
    // Phase 0: pure model resolution, before any network traffic.
    let models = registry::resolve(requested_models)?;
    info!(model_count = models.len(), "dispatching prompt to models");

    // Phase 1: concurrent generation, one deadline per call.
    let responses = generate(backend, &models, prompt, timeouts.generation()).await;

    // Compaction happens exactly once, here: failed slots drop out and the
    // survivors keep their model pairing.
    let candidates: Vec<(String, String)> = responses
        .into_iter()
        .filter_map(|CandidateResponse { model, text }| text.map(|t| (model, t)))
        .collect();

    if candidates.is_empty() {
        warn!("every generation call failed or timed out");
        return Err(GatewayError::NoViableCandidate);
    }
    debug!(candidate_count = candidates.len(), "generation phase complete");

    // Phase 2: concurrent evaluation. The judge itself never errors, but it
    // gets its own hard deadline; a fallback verdict or a timeout both mean
    // "no usable score", and the candidate is dropped.
    let evaluation_timeout = timeouts.evaluation();
    let evaluations = candidates.iter().map(|(model, text)| async move {
        match timeout(evaluation_timeout, judge.evaluate(prompt, text)).await {
            Ok(Verdict::Scored { score, reason }) => Some(EvaluatedCandidate {
                model: model.clone(),
                text: text.clone(),
                score,
                reason,
            }),
            Ok(Verdict::Fallback(fallback)) => {
                warn!(model = %model, reason = %fallback, "evaluation fell back");
                None
            }
            Err(_) => {
                warn!(model = %model, "evaluation call timed out");
                None
            }
        }
    });

    let evaluated: Vec<EvaluatedCandidate> = join_all(evaluations).await.into_iter().flatten().collect();

    if evaluated.is_empty() {
        warn!("every evaluation failed or timed out");
        return Err(GatewayError::NoViableCandidate);
    }

    let best = select_best(&evaluated).clone();
    info!(best_model = %best.model, best_score = best.score, "selected best candidate");

    Ok(GatewayResult {
        best,
        all_evaluated: evaluated,
    })
}

/// Stable max by score: the earliest candidate achieving the maximum wins.
///
/// Callers guarantee a non-empty slice; the pipeline returns
/// `NoViableCandidate` before ever getting here with nothing to pick from.
pub fn select_best(evaluated: &[EvaluatedCandidate]) -> &EvaluatedCandidate {
    let mut best = &evaluated[0];
    for candidate in &evaluated[1..] {
        if candidate.score > best.score {
            best = candidate;
        }
    }
    best
}
