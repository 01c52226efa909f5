//! Server startup with automatic configuration loading

use crate::config::Config;
use crate::server::server::HttpServer;
use crate::utils::error::Result;
use tracing::info;

const CONFIG_PATH: &str = "config/gateway.yaml";

/// Run the server, loading `config/gateway.yaml` when present and falling
/// back to defaults plus environment variables otherwise.
pub async fn run_server() -> Result<()> {
    // Credentials commonly live in a .env file during development
    dotenvy::dotenv().ok();

    let config = match Config::from_file(CONFIG_PATH).await {
        Ok(config) => {
            info!("Configuration file loaded: {}", CONFIG_PATH);
            config
        }
        Err(e) => {
            info!(
                "No usable configuration file ({}), using defaults with env overrides",
                e
            );
            Config::from_env()
        }
    };

    let server = HttpServer::new(&config)?;
    info!(
        "Server starting at http://{}",
        config.server.address()
    );
    info!("API endpoints:");
    info!("   GET  /health   - Health check");
    info!("   POST /v1/query - Best-of-N prompt query");

    server.start().await
}
