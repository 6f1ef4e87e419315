//! # Ticketgate Runtime
//!
//! The imperative shell around `ticketgate-core`.
//!
//! ## Core Components
//!
//! - **[`TicketService`]**: owns the ledger behind a single mutex, dispatches
//!   actions through the reducer and executes the resulting effects
//! - **[`JsonFileRepository`]**: the Ticket Store, one JSON file replaced
//!   atomically on every save
//! - **[`DirectoryArtifactStore`]**: rendered QR images, one PNG per ticket
//! - **[`QrCodec`]**: QR rendering (`qrcode`) and detection (`rqrr`)
//! - **[`metrics`]**: Prometheus counters for issuance and redemption
//!
//! ## Example
//!
//! ```ignore
//! use ticketgate_runtime::{TicketEnvironment, TicketService};
//!
//! let env = TicketEnvironment::production("tickets.json", "qr_codes", QrCodec::default()).await?;
//! let service = TicketService::open(env).await?;
//!
//! let issued = service.generate().await?;
//! let outcome = service.redeem(issued.id).await?;
//! ```

use serde::Serialize;

pub mod artifacts;
pub mod codec;
pub mod file_store;
pub mod metrics;
pub mod service;

mod fs;

pub use artifacts::DirectoryArtifactStore;
pub use codec::QrCodec;
pub use file_store::JsonFileRepository;
pub use service::{ScannedRedemption, TicketEnvironment, TicketService};

/// Health check status levels
///
/// Indicates the current health state of a component or system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum HealthStatus {
    /// Component is fully operational
    Healthy,

    /// Component is operational but experiencing issues (e.g., last save failed)
    Degraded,

    /// Component is not operational
    Unhealthy,
}

impl HealthStatus {
    /// Check if status is healthy
    #[must_use]
    pub const fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// Check if status is unhealthy
    #[must_use]
    pub const fn is_unhealthy(self) -> bool {
        matches!(self, Self::Unhealthy)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded => write!(f, "degraded"),
            Self::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Health check result for a component
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheck {
    /// Name of the component being checked
    pub component: String,

    /// Current health status
    pub status: HealthStatus,

    /// Optional message providing details
    pub message: Option<String>,

    /// Optional metadata (e.g., ticket counts)
    pub metadata: Vec<(String, String)>,
}

impl HealthCheck {
    /// Create a healthy check result
    #[must_use]
    pub fn healthy(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Healthy,
            message: None,
            metadata: Vec::new(),
        }
    }

    /// Create a degraded check result
    #[must_use]
    pub fn degraded(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Degraded,
            message: Some(message.into()),
            metadata: Vec::new(),
        }
    }

    /// Create an unhealthy check result
    #[must_use]
    pub fn unhealthy(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Unhealthy,
            message: Some(message.into()),
            metadata: Vec::new(),
        }
    }

    /// Add metadata to the health check
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_builders() {
        let check = HealthCheck::degraded("ledger", "last save failed").with_metadata("tickets", "3");
        assert_eq!(check.status, HealthStatus::Degraded);
        assert_eq!(check.message.as_deref(), Some("last save failed"));
        assert_eq!(check.metadata, vec![("tickets".to_string(), "3".to_string())]);
        assert!(HealthCheck::healthy("ledger").status.is_healthy());
        assert!(HealthCheck::unhealthy("ledger", "gone").status.is_unhealthy());
    }

    #[test]
    fn test_health_status_display() {
        assert_eq!(HealthStatus::Healthy.to_string(), "healthy");
        assert_eq!(HealthStatus::Degraded.to_string(), "degraded");
    }
}
