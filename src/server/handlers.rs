//! HTTP route handlers

use actix_web::HttpResponse;
use serde_json::json;

/// Health check endpoint handler
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Landing page: serves the bundled UI when one is deployed alongside the
/// binary, 404 otherwise.
pub async fn root() -> HttpResponse {
    match tokio::fs::read_to_string("static/index.html").await {
        Ok(html) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html),
        Err(_) => HttpResponse::NotFound().finish(),
    }
}
