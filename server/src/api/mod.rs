//! HTTP API endpoints.
//!
//! - [`tickets`]: issue, download, redeem by id, status
//! - [`scan`]: redeem or decode a photographed QR code
//! - [`metrics`]: Prometheus scrape endpoint

pub mod metrics;
pub mod scan;
pub mod tickets;

use serde::Serialize;
use ticketgate_core::Redemption;

/// Outcome of a redemption attempt.
///
/// Every outcome is a 200; only failures to process the request are errors.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RedemptionResponse {
    /// `valid`, `used` or `invalid`
    pub status: &'static str,
    /// Human-readable outcome
    pub message: &'static str,
    /// The ticket id as presented
    pub ticket_id: String,
}

impl RedemptionResponse {
    /// Build the response for `redemption` of `ticket_id`
    #[must_use]
    pub fn new(ticket_id: impl Into<String>, redemption: Redemption) -> Self {
        Self {
            status: redemption.status(),
            message: redemption.message(),
            ticket_id: ticket_id.into(),
        }
    }
}
