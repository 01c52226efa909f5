//! LLM judge
//!
//! Scores one (prompt, response) pair in [0, 1] with a short rationale by
//! asking a Gemini model for strict-JSON output. The judge never errors:
//! any internal failure becomes a fallback verdict so a bad judge call can
//! never sink the candidate batch. Transport failures and malformed judge
//! output are kept apart so logs show which path fired.

use crate::core::providers::ProviderHandle;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

/// Why a judge call fell back instead of scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The judge backend call itself failed (transport, HTTP error)
    Transport,
    /// The backend answered but not with usable `{score, reason}` JSON
    MalformedOutput,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::Transport => f.write_str("Internal evaluation error: judge backend unavailable"),
            FallbackReason::MalformedOutput => f.write_str("Internal evaluation error: malformed judge output"),
        }
    }
}

/// Outcome of one judge call
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// The judge produced a usable score
    Scored {
        /// Quality score in [0, 1]
        score: f64,
        /// Short explanation for the score
        reason: String,
    },
    /// The judge failed; score is defined as 0 and the candidate is
    /// excluded from selection
    Fallback(FallbackReason),
}

/// Anything that can score a (prompt, response) pair.
///
/// Implementations must be infallible in the `Result` sense: failure is a
/// [`Verdict::Fallback`], never a propagated error.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Score `response` as an answer to `prompt`.
    async fn evaluate(&self, prompt: &str, response: &str) -> Verdict;
}

const EVAL_PROMPT: &str = "You are an expert language model evaluator. \
Given the original prompt and the model's response, rate the quality of the response \
from 0 to 1 based on the following criteria.\n\
criteria: {criteria}\n\
Respond ONLY in JSON with the following keys:\n\
- score: a float from 0 to 1 (inclusive -> 1 indicates the best score).\n\
- reason: a short explanation for the score.\n\
Prompt: {prompt}\n\
Response: {response}";

#[derive(Debug, Deserialize)]
struct VerdictSchema {
    score: f64,
    reason: String,
}

/// Judge backed by a Gemini model on Vertex AI
pub struct LlmJudge {
    client: Arc<ProviderHandle>,
    model: String,
    criteria: String,
}

impl LlmJudge {
    /// Create a judge on top of an already-opened Vertex handle.
    pub fn new(client: Arc<ProviderHandle>, model: impl Into<String>, criteria: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            criteria: criteria.into(),
        }
    }

    fn build_prompt(&self, prompt: &str, response: &str) -> String {
        EVAL_PROMPT
            .replace("{criteria}", &self.criteria)
            .replace("{prompt}", prompt)
            .replace("{response}", response)
    }

    /// Deterministic, strict-JSON generation settings for the judge call.
    fn generation_config() -> Value {
        json!({
            "temperature": 0,
            "topP": 1,
            "maxOutputTokens": 1024,
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "score": {"type": "NUMBER"},
                    "reason": {"type": "STRING"},
                },
                "required": ["score", "reason"],
            },
        })
    }
}

#[async_trait]
impl Judge for LlmJudge {
    async fn evaluate(&self, prompt: &str, response: &str) -> Verdict {
        let eval_input = self.build_prompt(prompt, response);

        let vertex = match self.client.as_ref() {
            ProviderHandle::Vertex(client) => client,
            ProviderHandle::OpenAi(_) => {
                warn!("judge handle is not a Vertex client");
                return Verdict::Fallback(FallbackReason::Transport);
            }
        };

        let raw = match vertex
            .generate_content(&self.model, &eval_input, Some(Self::generation_config()))
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "judge backend call failed");
                return Verdict::Fallback(FallbackReason::Transport);
            }
        };

        parse_verdict(&raw)
    }
}

/// Parse the judge's raw JSON text into a verdict. Out-of-range scores are
/// treated the same as unparseable output: the model ignored the schema.
pub fn parse_verdict(raw: &str) -> Verdict {
    match serde_json::from_str::<VerdictSchema>(raw) {
        Ok(parsed) if (0.0..=1.0).contains(&parsed.score) => Verdict::Scored {
            score: parsed.score,
            reason: parsed.reason,
        },
        Ok(parsed) => {
            warn!(score = parsed.score, "judge score outside [0, 1]");
            Verdict::Fallback(FallbackReason::MalformedOutput)
        }
        Err(e) => {
            warn!(error = %e, "judge output was not valid verdict JSON");
            Verdict::Fallback(FallbackReason::MalformedOutput)
        }
    }
}
