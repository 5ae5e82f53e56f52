//! API route handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderName},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use tminus_core::types::{CacheKey, CountdownTarget, Payload};

use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

static X_CACHE: HeaderName = HeaderName::from_static("x-cache");

fn gif_response(gif: Payload, cache_status: &'static str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "image/gif"),
            (header::CACHE_CONTROL, "no-store"),
            (X_CACHE.clone(), cache_status),
        ],
        gif,
    )
        .into_response()
}

/// GET /countdown?date=YYYY-MM-DD
pub async fn countdown(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<CountdownQuery>, QueryRejection>,
) -> Result<Response> {
    // A malformed query string gets the same JSON error as a bad date.
    let Query(query) = query.map_err(|_| ApiError::bad_request("Invalid date"))?;
    let target = query
        .date
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("Invalid date"))
        .and_then(|date| CountdownTarget::parse(date).map_err(ApiError::from))?;

    let remaining = target.remaining();
    let key = CacheKey::derive(target.id(), remaining);

    if let Some(gif) = state.coordinator.lookup(&key) {
        info!(key = %key, "Cache hit");
        return Ok(gif_response(gif, "HIT"));
    }

    info!(key = %key, "Cache miss");
    let placeholder = state.coordinator.handle_miss(target.id(), remaining).await?;
    Ok(gif_response(placeholder, "MISS"))
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        cached_countdowns: state.coordinator.cache().len(),
    })
}

/// GET /api/v1/cache/stats
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let coordinator = &state.coordinator;
    Json(StatsResponse {
        cache: coordinator.cache().stats(),
        tracked_dates: coordinator.tracked_dates(),
        window_minutes: coordinator.config().window_minutes,
        sweep_budget_secs: coordinator.config().budget.as_secs(),
    })
}
