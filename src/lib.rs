//! # LLM Gateway
//!
//! A best-of-N gateway for LLM queries: one prompt goes out concurrently to
//! a caller-selected set of providers, an LLM judge scores every answer,
//! and the highest-scoring response comes back together with the full
//! scored candidate set.
//!
//! ## Design
//!
//! - Per-call timeouts on both generation and judging; one slow or failing
//!   provider never blocks its siblings.
//! - Backend connections are cached process-wide, per backend family and,
//!   for Vertex AI, per routing location.
//! - Failures local to one model are swallowed; only an entirely empty
//!   candidate set or a configuration problem surfaces to the caller.
//!
//! ## Gateway mode
//!
//! ```rust,no_run
//! use llm_gateway::{Config, Gateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/gateway.yaml").await?;
//!     let gateway = Gateway::new(config)?;
//!     gateway.run().await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod server;
pub mod utils;

pub use config::Config;
pub use core::orchestrator::{EvaluatedCandidate, GatewayResult};
pub use core::{BackendFamily, ClientCache, CompletionBackend, Judge, LlmJudge, Verdict};
pub use utils::error::{GatewayError, Result};

use tracing::info;

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A minimal gateway service wrapper
pub struct Gateway {
    server: server::HttpServer,
}

impl Gateway {
    /// Create a new gateway instance
    pub fn new(config: Config) -> Result<Self> {
        info!("Creating new gateway instance");
        let server = server::HttpServer::new(&config)?;
        Ok(Self { server })
    }

    /// Run the gateway server
    pub async fn run(self) -> Result<()> {
        info!("Starting LLM Gateway v{}", VERSION);
        self.server.start().await
    }
}
