//! Router configuration for the ticket system.

use super::state::AppState;
use crate::api::{metrics, scan, tickets};
use axum::{
    routing::{get, post},
    Router,
};
use ticketgate_web::handlers::health::{health_check, readiness};
use ticketgate_web::with_http_layers;

/// Build the complete Axum router.
///
/// Configures all routes:
/// - Ticket issuance, download and redemption
/// - Image scanning and decoding
/// - Ticket status lookup
/// - Health, readiness and metrics
///
/// `max_upload_bytes` limits request bodies (scanned images).
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    let router = Router::new()
        // Tickets
        .route("/generate", post(tickets::generate))
        .route("/download/:id", get(tickets::download))
        .route("/check", post(tickets::check))
        .route("/verify", post(tickets::check))
        .route("/tickets/:id", get(tickets::status))
        // Scanning
        .route("/scan", post(scan::scan))
        .route("/decode", post(scan::decode))
        // Operations
        .route("/health", get(health_check))
        .route("/ready", get(readiness))
        .route("/metrics", get(metrics::render))
        .with_state(state);

    with_http_layers(router, max_upload_bytes)
}
