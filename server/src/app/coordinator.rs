//! Application coordinator - main application lifecycle manager.

use crate::config::Config;
use crate::server::{build_router, shutdown, AppState};
use axum::Router;
use std::sync::Arc;
use thiserror::Error;
use ticketgate_core::TicketError;
use ticketgate_runtime::metrics::{MetricsError, MetricsExporter};
use ticketgate_runtime::{TicketEnvironment, TicketService};

/// Errors that stop the server from starting or keep it from serving.
#[derive(Error, Debug)]
pub enum StartupError {
    /// Ledger or artifact storage could not be opened
    #[error("Storage error: {0}")]
    Storage(#[from] TicketError),

    /// Prometheus recorder could not be installed
    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    /// Listener could not be bound or the server failed
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Main ticket application.
pub struct TicketgateApp {
    /// Shared handler state
    state: AppState,
    /// Configuration
    config: Config,
}

impl TicketgateApp {
    /// Initialize the application with all components.
    ///
    /// Loads the ledger, creates the QR directory and, when enabled, installs
    /// the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the ledger cannot be read (including a corrupt
    /// ledger file), the QR directory cannot be created, or the metrics
    /// recorder cannot be installed.
    pub async fn new(config: Config) -> Result<Self, StartupError> {
        tracing::info!("Initializing Ticketgate...");

        let metrics = if config.metrics.enabled {
            let mut exporter = MetricsExporter::new();
            exporter.start()?;
            Some(Arc::new(exporter))
        } else {
            tracing::info!("Metrics disabled");
            None
        };

        tracing::info!(
            tickets_file = %config.storage.tickets_file.display(),
            qr_codes_dir = %config.storage.qr_codes_dir.display(),
            "Opening ticket storage"
        );
        let environment = TicketEnvironment::production(
            &config.storage.tickets_file,
            &config.storage.qr_codes_dir,
            config.qr_codec(),
        )
        .await?;
        let service = Arc::new(TicketService::open(environment).await?);

        Ok(Self {
            state: AppState::new(service, metrics),
            config,
        })
    }

    /// The fully layered router.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), self.config.server.max_upload_bytes)
    }

    /// Bind the configured address and serve until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns error if the address cannot be bound or the server fails.
    pub async fn serve(self) -> Result<(), StartupError> {
        let addr = self.config.bind_address();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!(address = %addr, "Server listening");

        shutdown::serve_until(
            listener,
            self.router(),
            shutdown::shutdown_signal(),
            self.config.shutdown_timeout(),
        )
        .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}
