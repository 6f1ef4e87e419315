//! # Ticketgate Testing
//!
//! Testing utilities and helpers for Ticketgate.
//!
//! This crate provides:
//! - In-memory implementations of the environment traits ([`mocks`])
//! - A Given-When-Then harness for reducers ([`ReducerTest`])
//! - proptest strategies for ticket ids and ledgers ([`properties`])
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use ticketgate_core::environment::{ArtifactStore, CodeCodec, IdGenerator, TicketRepository};
//! use ticketgate_testing::mocks::{
//!     FakeCodec, InMemoryArtifactStore, InMemoryTicketRepository, SequentialIdGenerator,
//! };
//!
//! let repository: Arc<dyn TicketRepository> = Arc::new(InMemoryTicketRepository::new());
//! let artifacts: Arc<dyn ArtifactStore> = Arc::new(InMemoryArtifactStore::new());
//! let codec: Arc<dyn CodeCodec> = Arc::new(FakeCodec::default());
//! let ids: Arc<dyn IdGenerator> = Arc::new(SequentialIdGenerator::new());
//! # let _ = (repository, artifacts, codec, ids);
//! ```

pub mod mocks;

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;
    use ticketgate_core::{Ledger, TicketId, TicketState};
    use uuid::Uuid;

    /// Any ticket id
    pub fn ticket_id() -> impl Strategy<Value = TicketId> {
        any::<u128>().prop_map(|bits| TicketId::from_uuid(Uuid::from_u128(bits)))
    }

    /// Any ticket state
    pub fn ticket_state() -> impl Strategy<Value = TicketState> {
        prop_oneof![Just(TicketState::Unused), Just(TicketState::Used)]
    }

    /// Ledgers of up to `max` tickets
    pub fn ledger(max: usize) -> impl Strategy<Value = Ledger> {
        proptest::collection::vec((ticket_id(), ticket_state()), 0..=max)
            .prop_map(|entries| entries.into_iter().collect())
    }
}

// Re-export commonly used items
pub use mocks::{FakeCodec, InMemoryArtifactStore, InMemoryTicketRepository, SequentialIdGenerator};
pub use reducer_test::{ReducerTest, assertions};
