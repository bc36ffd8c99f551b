//! A key directory: key search, message posting and message listing over
//! form-encoded HTTP.

pub mod handlers;
pub mod registry;

use std::sync::Arc;

use axum::Router;

/// Server configuration.
pub struct ServerConfig {
    pub port: u16,
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8443,
            bind: "127.0.0.1".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Build the axum router for the key directory.
pub fn build_router(state: Arc<handlers::DirectoryState>) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health))
        .route(
            "/searchPublicKeys",
            axum::routing::post(handlers::search_public_keys),
        )
        .route("/postMessage", axum::routing::post(handlers::post_message))
        .route(
            "/latestMessages",
            axum::routing::post(handlers::latest_messages),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "service": "sealpost-directory",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
