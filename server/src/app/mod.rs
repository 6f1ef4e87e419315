//! Application coordinator - wires together all components.
//!
//! This module provides the main application structure that coordinates:
//! - Ticket ledger (JSON file)
//! - QR artifact directory
//! - Prometheus recorder
//! - HTTP server

mod coordinator;

pub use coordinator::{StartupError, TicketgateApp};
