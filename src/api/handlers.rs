//! API handlers
//!
//! All `/api/v1` handlers return `Response` via [`ApiResponse::ok`] or
//! [`ApiErrorResponse`]. Pipeline runs are CPU-bound, so they execute on the
//! blocking pool under the configured solve timeout. The timeout bounds the
//! response, not the solve: an expired worker is abandoned and runs to
//! completion in the background.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use tracing::{info, warn};

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::blend;
use crate::config::BlendConfig;
use crate::pipeline::{run_request, BlendError, OptimizationRequest};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BlendConfig>,
}

impl AppState {
    pub fn new(config: BlendConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(BlendConfig::default())
    }
}

fn parse_body(
    body: Result<Json<OptimizationRequest>, JsonRejection>,
) -> Result<OptimizationRequest, Response> {
    body.map(|Json(request)| request)
        .map_err(|rejection| ApiErrorResponse::bad_request(rejection.body_text()))
}

/// GET /health
pub async fn health() -> Response {
    Json(serde_json::json!({ "status": "ok" })).into_response()
}

/// POST /api/v1/validate
pub async fn validate(body: Result<Json<OptimizationRequest>, JsonRejection>) -> Response {
    let request = match parse_body(body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match blend::validate(&request.coal_sources, &request.target()) {
        Ok(report) => ApiResponse::ok(report),
        Err(e) => ApiErrorResponse::invalid_blend(e.to_string()),
    }
}

/// POST /api/v1/optimize
///
/// Responds 503 once `server.solve_timeout_secs` elapses. The blocking task
/// is not cancelled; its result is dropped when it finishes. microlp has no
/// time limit of its own but always terminates.
pub async fn optimize(
    State(state): State<AppState>,
    body: Result<Json<OptimizationRequest>, JsonRejection>,
) -> Response {
    let request = match parse_body(body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let timeout = state.config.server.solve_timeout();
    let config = Arc::clone(&state.config);
    let sources = request.coal_sources.len();
    let task = tokio::task::spawn_blocking(move || run_request(&request, &config));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(Ok(report))) => {
            info!(
                sources,
                success = report.solution.success,
                total_ms = report.timings.total_ms,
                "Optimize request served"
            );
            ApiResponse::ok(report)
        }
        Ok(Ok(Err(BlendError::Validation(e)))) => ApiErrorResponse::invalid_blend(e.to_string()),
        Ok(Ok(Err(e))) => ApiErrorResponse::internal(e.to_string()),
        Ok(Err(join_err)) => {
            warn!(error = %join_err, "Blend worker panicked");
            ApiErrorResponse::internal("Blend worker failed")
        }
        Err(_) => {
            warn!(
                timeout_secs = timeout.as_secs(),
                sources, "Blend pipeline timed out"
            );
            ApiErrorResponse::service_unavailable(format!(
                "Optimization did not finish within {}s",
                timeout.as_secs()
            ))
        }
    }
}

/// Fallback for unmatched paths.
pub async fn not_found() -> Response {
    ApiErrorResponse::not_found("No such endpoint")
}
