//! Health check endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use ticketgate_runtime::{HealthCheck, HealthStatus, TicketService};

/// Liveness response body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Liveness {
    /// Always `"ok"` while the process is serving requests
    pub status: &'static str,
    /// Crate version of the running server
    pub version: &'static str,
}

/// Simple health check endpoint (for basic liveness).
///
/// Returns 200 OK to indicate the service is running.
/// This endpoint does NOT check the ledger.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// { "status": "ok", "version": "0.1.0" }
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> Json<Liveness> {
    Json(Liveness {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Health check with ledger diagnostics (for readiness).
///
/// # Status Codes
///
/// - 200 OK: Healthy or Degraded
/// - 503 Service Unavailable: Unhealthy
///
/// # Endpoint
///
/// ```text
/// GET /ready
/// ```
///
/// # Response
///
/// ```json
/// {
///   "component": "ticket_ledger",
///   "status": "Healthy",
///   "message": null,
///   "metadata": [["unused", "3"], ["used", "1"]]
/// }
/// ```
pub async fn readiness(
    State(service): State<Arc<TicketService>>,
) -> (StatusCode, Json<HealthCheck>) {
    let health = service.health().await;

    let status = match health.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status, Json(health))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ticketgate_core::Ledger;
    use ticketgate_runtime::TicketEnvironment;
    use ticketgate_testing::{
        FakeCodec, InMemoryArtifactStore, InMemoryTicketRepository, SequentialIdGenerator,
    };

    fn service(repository: Arc<InMemoryTicketRepository>) -> Arc<TicketService> {
        let env = TicketEnvironment::new(
            repository,
            Arc::new(InMemoryArtifactStore::new()),
            Arc::new(FakeCodec::default()),
            Arc::new(SequentialIdGenerator::new()),
        );
        Arc::new(TicketService::with_ledger(Ledger::new(), env))
    }

    #[tokio::test]
    async fn test_simple_health_check() {
        let Json(body) = health_check().await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_readiness_with_healthy_ledger() {
        let (status, Json(health)) =
            readiness(State(service(Arc::new(InMemoryTicketRepository::new())))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(health.status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn test_readiness_degraded_after_failed_save() {
        let repository = Arc::new(InMemoryTicketRepository::new());
        let service = service(Arc::clone(&repository));
        repository.fail_saves(true);
        assert!(service.generate().await.is_err());

        let (status, Json(health)) = readiness(State(service)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(health.status, HealthStatus::Degraded);
    }
}
