//! OpenAI wire client
//!
//! Minimal chat-completions client. The gateway sends a single user message
//! and reads back the first choice's content; everything else the API offers
//! is out of scope here.

use crate::config::OpenAiConfig;
use crate::utils::error::{GatewayError, Result};
use serde::Deserialize;
use serde_json::json;

/// Handle to the OpenAI API
#[derive(Debug)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl OpenAiClient {
    /// Create a new client from configuration.
    ///
    /// Fails when no API key is configured; that is a deployment problem,
    /// not a per-request one.
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| GatewayError::client_init("OPENAI_API_KEY is not set"))?;

        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Get a completion from the given OpenAI model.
    pub async fn complete(&self, model: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base);
        let body = json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| GatewayError::internal("OpenAI response contained no choices"))
    }
}
