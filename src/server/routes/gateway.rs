//! Gateway query endpoint
//!
//! `POST /v1/query` takes a prompt plus an optional model selection, runs
//! the generate-and-judge pipeline, and returns the best response together
//! with the full scored candidate set.

use crate::core::orchestrator::{self, GatewayResult};
use crate::core::providers::BackendFamily;
use crate::core::registry;
use crate::core::{LlmJudge, RoutedBackend};
use crate::server::state::AppState;
use crate::utils::error::GatewayError;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Header carrying the caller's routing location for location-sensitive
/// backends.
pub const LOCATION_HEADER: &str = "x-gateway-location";

/// Model selection in the request body: a single name or a list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ModelSelection {
    /// One model id
    One(String),
    /// Several model ids, queried in the given order
    Many(Vec<String>),
}

impl ModelSelection {
    fn into_vec(self) -> Vec<String> {
        match self {
            ModelSelection::One(model) => vec![model],
            ModelSelection::Many(models) => models,
        }
    }
}

/// Query request body
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    /// Models to query; absent or empty means every registered model
    #[serde(default)]
    pub models: Option<ModelSelection>,
    /// The prompt to fan out
    pub prompt: String,
}

/// One scored model in the response
#[derive(Debug, Clone, Serialize)]
pub struct ScoredModelOutput {
    /// Model id
    pub name: String,
    /// Generated text
    pub output: String,
    /// Judge score in [0, 1]
    pub score: f64,
    /// Judge rationale
    pub reason: String,
}

/// Query response body
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    /// Best response text
    pub response: String,
    /// Score of the best response
    pub quality_score: f64,
    /// Judge rationale for the best response
    pub reason_of_score: String,
    /// Model that produced the best response
    pub model_used: String,
    /// Every candidate that survived generation and evaluation
    pub all_models_considered_with_scores: Vec<ScoredModelOutput>,
}

impl From<GatewayResult> for QueryResponse {
    fn from(result: GatewayResult) -> Self {
        Self {
            response: result.best.text,
            quality_score: result.best.score,
            reason_of_score: result.best.reason,
            model_used: result.best.model,
            all_models_considered_with_scores: result
                .all_evaluated
                .into_iter()
                .map(|candidate| ScoredModelOutput {
                    name: candidate.model,
                    output: candidate.text,
                    score: candidate.score,
                    reason: candidate.reason,
                })
                .collect(),
        }
    }
}

/// Configure gateway API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/v1").route("/query", web::post().to(query)));
}

/// Query endpoint: fan the prompt out, judge every answer, return the best.
pub async fn query(
    state: web::Data<AppState>,
    req: HttpRequest,
    request: web::Json<QueryRequest>,
) -> Result<HttpResponse, GatewayError> {
    let request = request.into_inner();
    if request.prompt.trim().is_empty() {
        return Err(GatewayError::validation("Prompt must not be empty"));
    }

    let location = routing_location(&req, &state);
    let request_id = Uuid::new_v4();
    info!(%request_id, location = %location, "gateway query received");

    // Resolve before touching any backend handle: an unsupported selection
    // is a client error and must win over configuration problems.
    let requested = request.models.map(ModelSelection::into_vec);
    let resolved = crate::core::registry::resolve(requested.as_deref())?;

    // Configuration problems are fatal for the request, not per-model
    // noise: open every backend handle the resolved models need before the
    // fan-out starts, so a bad credential surfaces as ClientInit instead
    // of candidate exhaustion.
    let mut families: Vec<BackendFamily> = Vec::new();
    for model in &resolved {
        if let Some(family) = registry::backend_for(model) {
            if !families.contains(&family) {
                state.clients.get(family, &location)?;
                families.push(family);
            }
        }
    }

    let backend = RoutedBackend::new(state.clients.clone(), location.clone());

    // The judge runs on Vertex in the request's location; opening its
    // handle can fail on misconfiguration, which is fatal for the request.
    let judge_handle = state.clients.get(BackendFamily::Vertex, &location)?;
    let judge = LlmJudge::new(
        judge_handle,
        state.config.judge.model.clone(),
        state.config.judge.criteria.clone(),
    );

    let result = orchestrator::run(
        &backend,
        &judge,
        Some(&resolved),
        &request.prompt,
        &state.config.timeouts,
    )
    .await?;

    Ok(HttpResponse::Ok().json(QueryResponse::from(result)))
}

fn routing_location(req: &HttpRequest, state: &AppState) -> String {
    req.headers()
        .get(LOCATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
        .unwrap_or_else(|| state.config.vertex.default_location.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_models_field_accepts_string_or_list() {
        let single: QueryRequest =
            serde_json::from_str(r#"{"models": "gpt-4", "prompt": "hi"}"#).unwrap();
        assert!(matches!(
            single.models,
            Some(ModelSelection::One(ref m)) if m == "gpt-4"
        ));

        let many: QueryRequest =
            serde_json::from_str(r#"{"models": ["gpt-4", "gemini-2.0-flash"], "prompt": "hi"}"#)
                .unwrap();
        match many.models {
            Some(ModelSelection::Many(models)) => assert_eq!(models.len(), 2),
            other => panic!("expected list selection, got {:?}", other),
        }

        let none: QueryRequest = serde_json::from_str(r#"{"prompt": "hi"}"#).unwrap();
        assert!(none.models.is_none());
    }

    #[test]
    fn test_query_response_from_result() {
        let result = GatewayResult {
            best: crate::core::EvaluatedCandidate {
                model: "gpt-4".to_string(),
                text: "42".to_string(),
                score: 0.8,
                reason: "direct".to_string(),
            },
            all_evaluated: vec![crate::core::EvaluatedCandidate {
                model: "gpt-4".to_string(),
                text: "42".to_string(),
                score: 0.8,
                reason: "direct".to_string(),
            }],
        };
        let response = QueryResponse::from(result);
        assert_eq!(response.model_used, "gpt-4");
        assert_eq!(response.quality_score, 0.8);
        assert_eq!(response.all_models_considered_with_scores.len(), 1);
    }
}
