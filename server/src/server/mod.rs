//! HTTP server module for the ticket system.
//!
//! This module provides the Axum-based HTTP server with:
//! - Application state management
//! - Router configuration
//! - Graceful shutdown handling

pub mod routes;
pub mod shutdown;
pub mod state;

pub use routes::build_router;
pub use shutdown::shutdown_signal;
pub use state::AppState;
