// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Readiness payload: uptime plus the rate limiter's view of traffic.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status.
    pub status: String,
    /// Seconds since the server started.
    pub uptime_seconds: u64,
    /// Clients currently tracked by the rate limiter.
    pub rate_limited_clients: usize,
    /// Configured requests per window.
    pub rate_limit_max: u32,
    /// Configured window length in seconds.
    pub rate_limit_window_secs: u64,
}

/// Liveness payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness check. Needs no token and is not rate limited.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<ReadyResponse> {
    let policy = state.rate_limiter.policy();
    Json(ReadyResponse {
        status: "ok".to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        rate_limited_clients: state.rate_limiter.store().len(),
        rate_limit_max: policy.max_requests,
        rate_limit_window_secs: policy.window.as_secs(),
    })
}

/// Liveness check: 200 while the process can serve requests.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Process is up", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
