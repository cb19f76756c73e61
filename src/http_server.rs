use axum::{response::Json, routing::get, Router};
use anyhow::{anyhow, Result};
use log::info;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

/// Keep-alive router for external uptime checks
pub fn create_server() -> Router {
    Router::new()
        .route("/", get(health_check))
        .layer(CorsLayer::permissive())
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Event bot is running",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn start_http_server(port: u16) -> Result<()> {
    let app = create_server();

    let listener = tokio::net::TcpListener::bind(&format!("0.0.0.0:{}", port))
        .await
        .map_err(|e| anyhow!("Failed to bind to port {}: {}", port, e))?;

    info!("🌐 Keep-alive server listening on port {}", port);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow!("HTTP server error: {}", e))?;

    Ok(())
}
