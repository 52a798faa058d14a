//! API route handlers.
//!
//! All endpoints return JSON. Validation failures become client-visible
//! 4xx responses with a `{"detail": ...}` body; the server keeps serving.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

use super::AppState;
use crate::estimator::EstimateError;
use crate::types::{AnalysisResult, StockRequest};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Client-visible API error: a status code plus a detail message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<EstimateError> for ApiError {
    fn from(err: EstimateError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// POST /analyze
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<StockRequest>,
) -> Result<Json<BTreeMap<String, AnalysisResult>>, ApiError> {
    let results = state.estimator.analyze_batch(&request).map_err(|e| {
        warn!(error = %e, "Rejected analysis request");
        ApiError::from(e)
    })?;

    info!(
        tickers = results.len(),
        investment = request.total_investment,
        "Analysis complete"
    );
    Ok(Json(results))
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Stock Analysis API. Send a POST request to /analyze with stock price data.",
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
