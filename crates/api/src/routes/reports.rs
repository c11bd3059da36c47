//! Report routes.
//!
//! `GET /reports` lists the registered reports; `POST /reports/{name}` runs
//! one with the JSON request body as its filters. `name` is the display name
//! or its slug (`general-ledger`).

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    routing::{get, post},
};
use glreport_core::reports::ReportOutput;
use glreport_shared::AppError;
use serde::Serialize;
use tracing::{debug, warn};

use crate::AppState;
use crate::error::ApiError;

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports", get(list_reports))
        .route("/reports/{name}", post(run_report))
}

/// Response for the report listing.
#[derive(Debug, Serialize)]
pub struct ReportListResponse {
    /// Registered report names.
    pub reports: Vec<&'static str>,
}

async fn list_reports(State(state): State<AppState>) -> Json<ReportListResponse> {
    Json(ReportListResponse {
        reports: state.registry.names(),
    })
}

/// Runs a report. An empty body runs it without filters.
async fn run_report(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<ReportOutput>, ApiError> {
    let filters: serde_json::Value = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::Validation(format!("Invalid JSON body: {e}")))?
    };
    debug!(report = %name, "running report");

    let registry = state.registry.clone();
    let report = name.clone();
    let output = tokio::task::spawn_blocking(move || registry.execute(&report, &filters))
        .await
        .map_err(|e| AppError::Internal(format!("report task failed: {e}")))?
        .inspect_err(|e| warn!(report = %name, code = e.error_code(), error = %e, "report failed"))?;

    Ok(Json(output))
}
