//! Ticketgate Server
//!
//! This binary:
//! - Loads configuration from the environment (and `.env`)
//! - Opens the ticket ledger and QR directory
//! - Serves the HTTP API until Ctrl+C or SIGTERM
//!
//! # Usage
//!
//! ```bash
//! TICKETS_FILE=/var/lib/ticketgate/tickets.json cargo run --bin ticketgate-server
//! ```

use ticketgate::{Config, TicketgateApp};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ticketgate=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!(
        address = %config.bind_address(),
        tickets_file = %config.storage.tickets_file.display(),
        log_level = %config.server.log_level,
        metrics = config.metrics.enabled,
        "Starting Ticketgate server"
    );

    let app = TicketgateApp::new(config).await?;
    app.serve().await?;

    Ok(())
}
