// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the IP ban ledger service.
//!
//! A reverse proxy or application calls `/visit` for every incoming client
//! and refuses the request when the response says `banned`. Operators use
//! `/ban`, `/status`, `/addresses` and `/stats`.

use crate::config::Config;
use crate::error::LedgerError;
use crate::ledger::{IpLedger, SweepReport};
use crate::metrics::LedgerMetrics;
use crate::state::LeafState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

/// Shared application state.
pub struct AppState {
    pub ledger: Arc<IpLedger>,
    pub metrics: Option<LedgerMetrics>,
    pub config: Config,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Visit request body.
#[derive(Debug, Deserialize)]
pub struct VisitRequest {
    pub ip: String,
}

/// Manual ban request body.
#[derive(Debug, Deserialize)]
pub struct BanRequest {
    pub ip: String,
    /// `-1..=-127` adds minutes, `-128` bans permanently. Read as `i64` so
    /// out-of-range values are reported as bad minutes.
    pub minutes: i64,
}

/// State of one address.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub ip: String,
    /// Packed value: visits if positive, ban minutes if negative, -128 permanent
    pub value: i8,
    pub state: &'static str,
    pub banned: bool,
}

impl StateResponse {
    fn new(ip: String, state: LeafState) -> Self {
        Self {
            ip,
            value: state.raw(),
            state: state.kind(),
            banned: state.is_banned(),
        }
    }
}

/// Tracked address listing.
#[derive(Debug, Serialize)]
pub struct AddressesResponse {
    pub count: usize,
    pub addresses: Vec<String>,
}

/// Ledger statistics.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub tracked: usize,
    pub memory_bytes: usize,
    pub allocated_branches: usize,
    pub visit_limit: u32,
    pub cycle_secs: u64,
    pub over_limit_ban_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sweep: Option<SweepReport>,
}

/// Request failures, rendered as `400 Bad Request`.
#[derive(Debug)]
pub enum ApiError {
    Ledger(LedgerError),
    Body(JsonRejection),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::Ledger(LedgerError::MalformedAddress(_)) => "MALFORMED_ADDRESS",
            ApiError::Ledger(LedgerError::InvalidBanMinutes(_)) => "INVALID_BAN_MINUTES",
            ApiError::Body(_) => "INVALID_BODY",
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            ApiError::Ledger(LedgerError::MalformedAddress(_)) => "malformed_address",
            ApiError::Ledger(LedgerError::InvalidBanMinutes(_)) => "invalid_ban_minutes",
            ApiError::Body(_) => "invalid_body",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Ledger(err) => err.to_string(),
            ApiError::Body(rejection) => rejection.body_text(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Ledger(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: self.message(),
                code: self.code(),
            }),
        )
            .into_response()
    }
}

fn rejected(state: &AppState, err: impl Into<ApiError>) -> ApiError {
    let err = err.into();
    warn!(error = %err.message(), code = err.code(), "Rejected request");
    if let Some(metrics) = &state.metrics {
        metrics.observe_rejection(err.reason());
    }
    err
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/visit", post(visit))
        .route("/ban", post(ban))
        .route("/status/:ip", get(status))
        .route("/addresses", get(addresses))
        .route("/stats", get(stats));

    if state.config.metrics.enabled {
        router = router.route(&state.config.metrics.path, get(metrics));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "ip-ban-ledger",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Record one visit from a client address.
pub async fn visit(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VisitRequest>, JsonRejection>,
) -> Result<Json<StateResponse>, ApiError> {
    let Json(req) = payload.map_err(|err| rejected(&state, err))?;
    let outcome = state
        .ledger
        .visit(&req.ip)
        .map_err(|err| rejected(&state, err))?;

    if let Some(metrics) = &state.metrics {
        metrics.observe_visit(&outcome);
    }
    debug!(ip = %req.ip, state = %outcome.state, "Visit processed");

    Ok(Json(StateResponse::new(req.ip, outcome.state)))
}

/// Ban an address manually, or extend an existing ban.
pub async fn ban(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BanRequest>, JsonRejection>,
) -> Result<Json<StateResponse>, ApiError> {
    let Json(req) = payload.map_err(|err| rejected(&state, err))?;
    let minutes = i8::try_from(req.minutes)
        .map_err(|_| rejected(&state, LedgerError::InvalidBanMinutes(req.minutes)))?;
    let result = state
        .ledger
        .extend_ban(&req.ip, minutes)
        .map_err(|err| rejected(&state, err))?;

    if let Some(metrics) = &state.metrics {
        metrics.observe_manual_ban(result);
    }

    Ok(Json(StateResponse::new(req.ip, result)))
}

/// Look up an address without recording a visit.
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(ip): Path<String>,
) -> Result<Json<StateResponse>, ApiError> {
    let result = state
        .ledger
        .is_banned(&ip)
        .map_err(|err| rejected(&state, err))?;
    Ok(Json(StateResponse::new(ip, result)))
}

/// List every tracked address in ascending order.
pub async fn addresses(State(state): State<Arc<AppState>>) -> Json<AddressesResponse> {
    let addresses = state.ledger.list_all();
    Json(AddressesResponse {
        count: addresses.len(),
        addresses,
    })
}

/// Ledger size, memory and decay statistics.
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let ledger = &state.ledger;
    let config = ledger.config();
    Json(StatsResponse {
        tracked: ledger.count(),
        memory_bytes: ledger.estimate_memory(),
        allocated_branches: ledger.allocated_branches(),
        visit_limit: config.visit_limit,
        cycle_secs: config.cycle_secs,
        over_limit_ban_minutes: config.over_limit_ban_minutes,
        last_sweep: ledger.last_sweep(),
    })
}

/// Prometheus text exposition.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    let Some(metrics) = &state.metrics else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match metrics.render(&state.ledger) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
