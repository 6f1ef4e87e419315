//! Ticket lifecycle reducer.
//!
//! Turns [`LedgerAction`]s into ledger transitions. The reducer decides the
//! outcome and which effects follow; the runtime decides how to carry them
//! out (and under which lock).

use crate::effect::{Effect, Effects, Metric};
use crate::ledger::Ledger;
use crate::reducer::Reducer;
use crate::ticket::{Redemption, TicketId};
use smallvec::smallvec;

/// Actions accepted by the ledger
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerAction {
    /// Record a freshly generated ticket as unused
    Issue {
        /// Identifier of the new ticket
        id: TicketId,
    },

    /// Redeem a ticket (the `Unused → Used` transition)
    Redeem {
        /// Identifier presented at the gate
        id: TicketId,
    },
}

/// What the dispatcher learns from a reduce call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerOutput {
    /// The ticket was added
    Issued(TicketId),

    /// The id was already in the ledger; nothing changed
    Duplicate(TicketId),

    /// Result of a redemption attempt
    Redemption(Redemption),
}

impl LedgerOutput {
    /// Redemption outcome, if this output came from a `Redeem` action
    #[must_use]
    pub const fn redemption(self) -> Option<Redemption> {
        match self {
            Self::Redemption(outcome) => Some(outcome),
            Self::Issued(_) | Self::Duplicate(_) => None,
        }
    }
}

/// Reducer for the ticket ledger
#[derive(Clone, Copy, Debug, Default)]
pub struct LedgerReducer;

impl Reducer for LedgerReducer {
    type State = Ledger;
    type Action = LedgerAction;
    type Output = LedgerOutput;

    fn reduce(&self, state: &mut Ledger, action: LedgerAction) -> (LedgerOutput, Effects) {
        match action {
            LedgerAction::Issue { id } => {
                if state.issue(id) {
                    (
                        LedgerOutput::Issued(id),
                        smallvec![Effect::Persist, Effect::Metric(Metric::Issued)],
                    )
                } else {
                    (LedgerOutput::Duplicate(id), Effects::new())
                }
            },

            LedgerAction::Redeem { id } => {
                let outcome = state.redeem(&id);
                let effects = match outcome {
                    Redemption::Valid => {
                        smallvec![Effect::Persist, Effect::Metric(Metric::Redeemed(outcome))]
                    },
                    Redemption::AlreadyUsed | Redemption::NotFound => {
                        smallvec![Effect::Metric(Metric::Redeemed(outcome))]
                    },
                };
                (LedgerOutput::Redemption(outcome), effects)
            },
        }
    }
}
