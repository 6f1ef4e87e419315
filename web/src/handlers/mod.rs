//! HTTP handlers shared by Ticketgate servers.

pub mod health;
