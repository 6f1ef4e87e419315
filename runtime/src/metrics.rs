//! Prometheus metrics for observability and monitoring.
//!
//! Counters are recorded through the `metrics` facade, so recording is a
//! no-op until an exporter is installed. The server installs one with
//! [`MetricsExporter::start`] and renders it on `GET /metrics`.
//!
//! # Example
//!
//! ```rust,no_run
//! use ticketgate_runtime::metrics::MetricsExporter;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut exporter = MetricsExporter::new();
//! exporter.start()?;
//!
//! let text = exporter.render().unwrap_or_default();
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use thiserror::Error;
use ticketgate_core::effect::Metric;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, gauge, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus exporter handle.
///
/// Holds the recorder handle used to render the scrape output.
#[derive(Default)]
pub struct MetricsExporter {
    handle: Option<PrometheusHandle>,
}

impl MetricsExporter {
    /// Create an exporter that has not been installed yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Describe all metrics and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// Only one recorder can exist per process. If one is already installed
    /// (e.g. by an earlier test) this logs a warning and leaves the exporter
    /// without a handle.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!("Prometheus recorder installed");
                Ok(())
            },
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            },
        }
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus format.
    ///
    /// Returns `None` if the exporter hasn't been started.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    describe_counter!("tickets_issued_total", "Total number of tickets issued");
    describe_counter!(
        "tickets_redeemed_total",
        "Redemption attempts by outcome (valid, used, invalid)"
    );
    describe_counter!(
        "ticket_decode_failures_total",
        "Submitted images in which no QR code could be read"
    );
    describe_counter!(
        "ledger_persist_failures_total",
        "Ledger saves that failed and were rolled back"
    );
    describe_histogram!(
        "ledger_persist_duration_seconds",
        "Time taken to write the ledger through to storage"
    );
    describe_gauge!("ledger_tickets", "Tickets in the ledger by state");
}

/// Ticket metrics recorder.
pub struct TicketMetrics;

impl TicketMetrics {
    /// Record a counter described by a reducer effect.
    pub fn record(metric: Metric) {
        match metric {
            Metric::Issued => counter!("tickets_issued_total").increment(1),
            Metric::Redeemed(outcome) => {
                counter!("tickets_redeemed_total", "outcome" => outcome.status()).increment(1);
            },
        }
    }

    /// Record a successful ledger save.
    pub fn record_persist(duration: Duration) {
        histogram!("ledger_persist_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record a failed ledger save.
    pub fn record_persist_failure() {
        counter!("ledger_persist_failures_total").increment(1);
    }

    /// Record an image without a readable code.
    pub fn record_decode_failure() {
        counter!("ticket_decode_failures_total").increment(1);
    }

    /// Publish the current ticket counts.
    #[allow(clippy::cast_precision_loss)] // ticket counts stay far below 2^52
    pub fn record_ledger_size(unused: usize, used: usize) {
        gauge!("ledger_tickets", "state" => "unused").set(unused as f64);
        gauge!("ledger_tickets", "state" => "used").set(used as f64);
    }
}
