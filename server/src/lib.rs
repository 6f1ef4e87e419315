//! Ticketgate - single-use QR tickets over HTTP.
//!
//! Issues tickets as UUIDs rendered into QR codes, keeps their redemption
//! state in a JSON ledger, and redeems them by id or by a photo of the code.
//!
//! # Architecture
//!
//! ```text
//!   POST /generate   GET /download/:id   POST /check   POST /scan
//!          │                 │                │             │
//!          └─────────────────┴───────┬────────┴─────────────┘
//!                                    ▼
//!                          ┌───────────────────┐
//!                          │   TicketService   │  one mutex around the ledger
//!                          └───────────────────┘
//!                            │        │       │
//!                            ▼        ▼       ▼
//!                     tickets.json  qr_codes/  QR codec
//! ```
//!
//! # Ticket lifecycle
//!
//! ```text
//! Generate → Unused ──Redeem──▶ Used
//!                                 │
//!                                 └──Redeem──▶ "used" (no change)
//! ```
//!
//! A redemption is only reported `valid` once the ledger file records it.

#![forbid(unsafe_code)]

pub mod api;
pub mod app;
pub mod config;
pub mod server;

pub use app::{StartupError, TicketgateApp};
pub use config::Config;
pub use server::{build_router, AppState};
