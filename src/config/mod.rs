//! Configuration management for the gateway
//!
//! This module handles loading, validation, and management of all gateway
//! configuration. Configuration is read from a YAML file with environment
//! variables filling in credentials, matching the `.env` workflow used in
//! deployment.

use crate::utils::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_openai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_location() -> String {
    "us-central1".to_string()
}

fn default_judge_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_criteria() -> String {
    "Quality of Response. How good the Response is with respect to Prompt".to_string()
}

fn default_call_timeout() -> u64 {
    10
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Get the server bind address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// OpenAI backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API key; falls back to the `OPENAI_API_KEY` environment variable
    #[serde(default)]
    pub api_key: Option<String>,
    /// API base URL, overridable for self-hosted gateways and tests
    #[serde(default = "default_openai_api_base")]
    pub api_base: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_openai_api_base(),
        }
    }
}

/// Vertex AI backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexConfig {
    /// Google Cloud project id; falls back to `VERTEXAI_PROJECT_ID`
    #[serde(default)]
    pub project_id: Option<String>,
    /// Bearer token used for Vertex requests; falls back to
    /// `VERTEXAI_ACCESS_TOKEN`
    #[serde(default)]
    pub access_token: Option<String>,
    /// Location used when the caller does not supply a routing header
    #[serde(default = "default_location")]
    pub default_location: String,
    /// Override of the regional API base URL. When set, the
    /// `{location}-aiplatform.googleapis.com` scheme is bypassed; used for
    /// tests against a local mock server.
    #[serde(default)]
    pub api_base: Option<String>,
}

impl Default for VertexConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            access_token: None,
            default_location: default_location(),
            api_base: None,
        }
    }
}

/// Judge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeConfig {
    /// Model the judge runs on (a Vertex Gemini model)
    #[serde(default = "default_judge_model")]
    pub model: String,
    /// Default evaluation criteria
    #[serde(default = "default_criteria")]
    pub criteria: String,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            model: default_judge_model(),
            criteria: default_criteria(),
        }
    }
}

/// Per-call timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Deadline for each provider generation call, in seconds
    #[serde(default = "default_call_timeout")]
    pub generation_secs: u64,
    /// Deadline for each judge call, in seconds
    #[serde(default = "default_call_timeout")]
    pub evaluation_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            generation_secs: default_call_timeout(),
            evaluation_secs: default_call_timeout(),
        }
    }
}

impl TimeoutConfig {
    /// Generation deadline as a [`Duration`]
    pub fn generation(&self) -> Duration {
        Duration::from_secs(self.generation_secs)
    }

    /// Evaluation deadline as a [`Duration`]
    pub fn evaluation(&self) -> Duration {
        Duration::from_secs(self.evaluation_secs)
    }
}

/// Main configuration struct for the gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// OpenAI backend settings
    #[serde(default)]
    pub openai: OpenAiConfig,
    /// Vertex AI backend settings
    #[serde(default)]
    pub vertex: VertexConfig,
    /// Judge settings
    #[serde(default)]
    pub judge: JudgeConfig,
    /// Per-call timeouts
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

impl Config {
    /// Load configuration from a YAML file, then apply environment overrides
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GatewayError::config(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .map_err(|e| GatewayError::config(format!("Failed to parse config: {}", e)))?;

        config.apply_env();
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Build a default configuration with environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Fill credential fields from the environment when the file left them
    /// unset. File values win so test configs stay self-contained.
    pub fn apply_env(&mut self) {
        if self.openai.api_key.is_none() {
            self.openai.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        if self.vertex.project_id.is_none() {
            self.vertex.project_id = std::env::var("VERTEXAI_PROJECT_ID").ok();
        }
        if self.vertex.access_token.is_none() {
            self.vertex.access_token = std::env::var("VERTEXAI_ACCESS_TOKEN").ok();
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(GatewayError::config("Server port cannot be 0"));
        }
        if self.timeouts.generation_secs == 0 || self.timeouts.evaluation_secs == 0 {
            return Err(GatewayError::config("Per-call timeouts cannot be 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.vertex.default_location, "us-central1");
        assert_eq!(config.judge.model, "gemini-2.0-flash");
        assert_eq!(config.timeouts.generation(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
server:
  port: 9001
vertex:
  project_id: test-project
  default_location: europe-west4
timeouts:
  generation_secs: 3
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.vertex.project_id.as_deref(), Some("test-project"));
        assert_eq!(config.vertex.default_location, "europe-west4");
        assert_eq!(config.timeouts.generation_secs, 3);
        // unspecified section keeps its default
        assert_eq!(config.timeouts.evaluation_secs, 10);
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.timeouts.generation_secs = 0;
        assert!(config.validate().is_err());
    }
}
