//! Vertex AI wire client
//!
//! Talks to the regional `generateContent` endpoint. One client is bound to
//! one location; the client cache keeps a handle per location because the
//! regional hostname differs.

use crate::config::VertexConfig;
use crate::utils::error::{GatewayError, Result};
use serde_json::{json, Value};

const API_VERSION: &str = "v1";

/// Handle to Vertex AI for a single location
#[derive(Debug)]
pub struct VertexClient {
    http: reqwest::Client,
    project_id: String,
    location: String,
    access_token: Option<String>,
    /// Test override; production derives the base URL from the location
    api_base: Option<String>,
}

impl VertexClient {
    /// Create a new client bound to `location`.
    pub fn new(config: &VertexConfig, location: &str) -> Result<Self> {
        let project_id = config
            .project_id
            .clone()
            .ok_or_else(|| GatewayError::client_init("VERTEXAI_PROJECT_ID is not set"))?;

        Ok(Self {
            http: reqwest::Client::new(),
            project_id,
            location: location.to_string(),
            access_token: config.access_token.clone(),
            api_base: config.api_base.clone(),
        })
    }

    fn model_url(&self, model: &str, endpoint: &str) -> String {
        let base = match &self.api_base {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}-aiplatform.googleapis.com", self.location),
        };
        format!(
            "{}/{}/projects/{}/locations/{}/publishers/google/models/{}:{}",
            base, API_VERSION, self.project_id, self.location, model, endpoint
        )
    }

    /// Get a plain completion from the given Gemini model.
    pub async fn complete(&self, model: &str, prompt: &str) -> Result<String> {
        self.generate_content(model, prompt, None).await
    }

    /// Call `generateContent`, optionally with a `generationConfig` (the
    /// judge uses this to force strict-JSON output).
    pub async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        generation_config: Option<Value>,
    ) -> Result<String> {
        let url = self.model_url(model, "generateContent");

        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": prompt}],
            }],
        });
        if let Some(config) = generation_config {
            body["generationConfig"] = config;
        }

        let mut request = self.http.post(&url).json(&body);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        let response_json: Value = response.json().await?;

        extract_text(&response_json)
    }

    /// Location this handle is bound to
    pub fn location(&self) -> &str {
        &self.location
    }
}

/// Pull the first candidate's text out of a `generateContent` response.
fn extract_text(response: &Value) -> Result<String> {
    response
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(|parts| parts.as_array())
        .and_then(|parts| parts.first())
        .and_then(|part| part.get("text"))
        .and_then(|text| text.as_str())
        .map(|text| text.to_string())
        .ok_or_else(|| GatewayError::internal("Missing candidates in Vertex response"))
}
