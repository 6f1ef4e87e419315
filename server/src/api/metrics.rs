//! Prometheus scrape endpoint.

use crate::server::state::AppState;
use axum::{extract::State, http::header, response::IntoResponse};
use ticketgate_web::error::AppError;

/// Render all metrics in the Prometheus text format.
///
/// # Errors
///
/// Returns 404 when metrics are disabled, or 503 when the recorder could
/// not be installed.
#[allow(clippy::unused_async)]
pub async fn render(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let exporter = state
        .metrics
        .as_ref()
        .ok_or_else(|| AppError::not_found("Endpoint", "/metrics"))?;

    let body = exporter
        .render()
        .ok_or_else(|| AppError::unavailable("Metrics recorder is not installed"))?;

    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
