//! Error handling for the gateway
//!
//! This module defines all error types used throughout the gateway.

use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Result type alias for the gateway
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Main error type for the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// None of the requested models is supported
    #[error("No selected models - {requested:?} are supported")]
    ModelSelection {
        /// The list the caller asked for, kept for diagnostics
        requested: Vec<String>,
    },

    /// Every candidate failed generation or evaluation
    #[error("No viable candidate: all model responses failed generation or evaluation")]
    NoViableCandidate,

    /// Backend handle could not be created (bad credentials/config)
    #[error("Client initialization error: {0}")]
    ClientInit(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ResponseError for GatewayError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            GatewayError::ModelSelection { .. } => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "MODEL_SELECTION_ERROR",
                self.to_string(),
            ),
            GatewayError::NoViableCandidate => (
                actix_web::http::StatusCode::BAD_GATEWAY,
                "NO_VIABLE_CANDIDATE",
                self.to_string(),
            ),
            GatewayError::ClientInit(_) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "CLIENT_INIT_ERROR",
                self.to_string(),
            ),
            GatewayError::Config(_) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                self.to_string(),
            ),
            GatewayError::Validation(_) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                self.to_string(),
            ),
            _ => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: error_code.to_string(),
                message,
                timestamp: chrono::Utc::now().timestamp(),
            },
        };

        HttpResponse::build(status_code).json(error_response)
    }
}

/// Standard error response format
#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub timestamp: i64,
}

impl GatewayError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn client_init<S: Into<String>>(message: S) -> Self {
        Self::ClientInit(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }
}
