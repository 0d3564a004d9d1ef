//! HTTP surface: router assembly, shared state, and error-to-status mapping.

pub mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::error::PriceError;
use crate::pipeline::PricePipeline;

/// Shared application state, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PricePipeline>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health_handler))
        .route("/api/prices/*slug", get(routes::prices_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on http://{}", addr);
    axum::serve(listener, build_router(state))
        .await
        .context("Server error")?;

    Ok(())
}

impl IntoResponse for PriceError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            PriceError::NoQuotesFound => (StatusCode::NOT_FOUND, self.to_string()),
            PriceError::FetchTimeout { .. } => (StatusCode::GATEWAY_TIMEOUT, self.to_string()),
            // Browser internals and worker faults never leak to clients.
            PriceError::FetchFailed(detail) => {
                error!("Fetch failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            PriceError::Unexpected(detail) => {
                error!("Unexpected fault: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}
