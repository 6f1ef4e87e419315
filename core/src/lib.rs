//! # Ticketgate Core
//!
//! Domain types and the redemption state machine for the Ticketgate service.
//!
//! This crate is the functional core: it knows nothing about files, HTTP or
//! QR rendering. Those live behind the traits in [`environment`] and are
//! implemented by the runtime crate.
//!
//! ## Core Concepts
//!
//! - **Ticket**: a UUID identifier plus a [`TicketState`] (`Unused` or `Used`)
//! - **Ledger**: the mapping from ticket id to state
//! - **Action**: a request against the ledger (`Issue`, `Redeem`)
//! - **Reducer**: pure function `(Ledger, Action) → (Output, Effects)`
//! - **Effect**: a description of what the runtime must do afterwards
//!   (persist the ledger, record a metric)
//!
//! ## State Machine
//!
//! ```text
//!   Issue ──► Unused ──Redeem──► Used
//!                                 │
//!                                 └──Redeem──► (AlreadyUsed, no change)
//! ```
//!
//! `Used` is terminal. Nothing in this crate can move a ticket back.
//!
//! ## Example
//!
//! ```
//! use ticketgate_core::{Ledger, LedgerAction, LedgerReducer, Redemption, TicketId};
//! use ticketgate_core::reducer::Reducer;
//!
//! let mut ledger = Ledger::new();
//! let id = TicketId::new();
//!
//! LedgerReducer.reduce(&mut ledger, LedgerAction::Issue { id });
//! let (output, _effects) = LedgerReducer.reduce(&mut ledger, LedgerAction::Redeem { id });
//!
//! assert_eq!(output.redemption(), Some(Redemption::Valid));
//! ```

pub mod environment;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod ticket;

pub use error::{ArtifactError, CodecError, RepositoryError, TicketError};
pub use ledger::{Ledger, LedgerSnapshot, TicketRecord};
pub use lifecycle::{LedgerAction, LedgerOutput, LedgerReducer};
pub use smallvec::{smallvec, SmallVec};
pub use ticket::{download_reference, IssuedTicket, Redemption, TicketId, TicketState};

/// Reducer module - the core trait for business logic
///
/// Reducers are pure functions: `(State, Action) → (Output, Effects)`.
/// They mutate state in place, report what happened, and describe the side
/// effects the runtime has to carry out. They never perform I/O themselves.
pub mod reducer {
    use super::effect::Effects;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Output`: What the caller learns about the action's outcome
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for LedgerReducer {
    ///     type State = Ledger;
    ///     type Action = LedgerAction;
    ///     type Output = LedgerOutput;
    ///
    ///     fn reduce(&self, state: &mut Ledger, action: LedgerAction) -> (LedgerOutput, Effects) {
    ///         match action {
    ///             LedgerAction::Redeem { id } => { /* ... */ }
    ///             LedgerAction::Issue { id } => { /* ... */ }
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The result reported back to whoever dispatched the action
        type Output;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action against the current state
        /// 2. Updates state in place
        /// 3. Returns the outcome and the effects to be executed
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
        ) -> (Self::Output, Effects);
    }
}

/// Effect module - side effect descriptions
///
/// Effects are values, not execution. The runtime interprets them after the
/// reducer returns: `Persist` is carried out before the new state is
/// committed, `Metric` after.
pub mod effect {
    use crate::ticket::Redemption;
    use smallvec::SmallVec;

    /// Counters the runtime records once a transition has been committed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Metric {
        /// A ticket was added to the ledger
        Issued,
        /// A redemption attempt finished with the given outcome
        Redeemed(Redemption),
    }

    /// Effect type - describes a side effect to be executed
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Effect {
        /// Write the whole ledger through to the ticket repository
        Persist,

        /// Record a counter
        Metric(Metric),
    }

    /// Effects returned by a single reduce call.
    pub type Effects = SmallVec<[Effect; 4]>;

    /// Returns true when the effects require the ledger to be saved.
    #[must_use]
    pub fn requires_persist(effects: &[Effect]) -> bool {
        effects.iter().any(|e| matches!(e, Effect::Persist))
    }
}
