//! Axum integration for Ticketgate.
//!
//! This crate is the imperative shell between HTTP and the
//! [`TicketService`](ticketgate_runtime::TicketService):
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Imperative Shell (Axum)         │  ← HTTP, JSON, multipart
//! │  - Request parsing (ScanImage)          │  ← CORS, request ids
//! │  - Response mapping (AppError)          │  ← Tracing
//! ├─────────────────────────────────────────┤
//! │         Ticket Service (runtime)        │  ← Ledger lock, storage, QR
//! ├─────────────────────────────────────────┤
//! │         Functional Core                 │
//! │  - Ledger reducer                       │  ← No I/O, no side effects
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives at an Axum handler
//! 2. **Extract data** from the request (JSON, path, uploaded image)
//! 3. **Call** the ticket service
//! 4. **Map result** to a JSON body, or an [`AppError`] to an error body

#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::ScanImage;
pub use middleware::{with_http_layers, REQUEST_ID_HEADER};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
