//! Request handlers and wire DTOs.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::error::PriceError;
use crate::models::{PriceQuote, PriceSummary};
use crate::server::AppState;
use crate::utils::Stopwatch;

// ── Health ────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

/// Static readiness probe; never touches the pipeline or a browser.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ── Price lookup ──────────────────────────────────────────────────────────────

/// Optional per-request overrides of the configured filter profile.
///
/// Values arrive as raw strings and are parsed in [`validate_bounds`], so a
/// malformed number gets the same JSON error envelope as an out-of-range one
/// instead of the extractor's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub struct PriceQuery {
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub max_results: Option<String>,
}

/// Parsed overrides, ready to merge into the filter profile.
struct BoundOverrides {
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
    max_results: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PriceResponse {
    pub success: bool,
    pub data: Vec<PriceQuote>,
    pub summary: PriceSummary,
    /// Wall-clock seconds for the whole lookup, two decimal places.
    pub execution_time: f64,
    pub timestamp: DateTime<Utc>,
}

pub async fn prices_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<PriceQuery>,
) -> Response {
    let stopwatch = Stopwatch::start(format!("price lookup {}", slug));

    let overrides = match validate_bounds(&params) {
        Ok(overrides) => overrides,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": message })),
            )
                .into_response();
        }
    };

    let filter = state.pipeline.default_filter().merged(
        overrides.min_price,
        overrides.max_price,
        overrides.max_results,
    );

    // Dedicated worker per request: the run is detached from the connection,
    // so a client disconnect cannot cancel a lookup mid-fetch and a panic
    // surfaces as an opaque internal fault instead of a hung socket.
    let pipeline = Arc::clone(&state.pipeline);
    let worker = tokio::spawn(async move { pipeline.run(&slug, &filter).await });

    match worker.await {
        Ok(Ok(report)) => Json(PriceResponse {
            success: true,
            data: report.quotes,
            summary: report.summary,
            execution_time: stopwatch.elapsed_secs(),
            timestamp: Utc::now(),
        })
        .into_response(),
        Ok(Err(err)) => err.into_response(),
        Err(join_err) => {
            error!("Lookup worker failed: {}", join_err);
            PriceError::Unexpected(join_err.to_string()).into_response()
        }
    }
}

fn validate_bounds(params: &PriceQuery) -> Result<BoundOverrides, String> {
    let min_price = parse_bound("min_price", params.min_price.as_deref())?;
    let max_price = parse_bound("max_price", params.max_price.as_deref())?;
    let max_results = match params.max_results.as_deref() {
        None => None,
        Some(raw) => Some(raw.trim().parse::<usize>().map_err(|_| {
            format!("max_results must be a positive integer, got {:?}", raw)
        })?),
    };

    if min_price.is_some_and(|v| v.is_sign_negative())
        || max_price.is_some_and(|v| v.is_sign_negative())
    {
        return Err("price bounds must be non-negative".to_string());
    }
    if let (Some(min), Some(max)) = (min_price, max_price) {
        if min > max {
            return Err("min_price must not exceed max_price".to_string());
        }
    }
    if max_results == Some(0) {
        return Err("max_results must be positive".to_string());
    }

    Ok(BoundOverrides {
        min_price,
        max_price,
        max_results,
    })
}

fn parse_bound(name: &str, raw: Option<&str>) -> Result<Option<Decimal>, String> {
    match raw {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(|_| format!("{} must be a number, got {:?}", name, raw)),
    }
}
