//! Application state for the ticket HTTP server.

use axum::extract::FromRef;
use std::sync::Arc;
use ticketgate_runtime::TicketService;
use ticketgate_runtime::metrics::MetricsExporter;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via Arc) for each request.
#[derive(Clone)]
pub struct AppState {
    /// The ticket service owning the ledger
    pub service: Arc<TicketService>,

    /// Prometheus exporter, absent when metrics are disabled
    pub metrics: Option<Arc<MetricsExporter>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub const fn new(service: Arc<TicketService>, metrics: Option<Arc<MetricsExporter>>) -> Self {
        Self { service, metrics }
    }
}

// Lets handlers extract the service directly
impl FromRef<AppState> for Arc<TicketService> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.service)
    }
}
