//! The ticket ledger: every issued ticket and its redemption state.
//!
//! The ledger is keyed by [`TicketId`], so "the key equals the ticket's id"
//! holds by construction. Mutation is crate-private and only goes through
//! [`LedgerReducer`](crate::LedgerReducer), which offers no way to move a
//! ticket from `Used` back to `Unused`.
//!
//! On disk the ledger is a JSON object `{"<uuid>": {"used": bool}}`, see
//! [`LedgerSnapshot`].

use crate::ticket::{Redemption, TicketId, TicketState};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// In-memory mapping from ticket id to redemption state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LedgerSnapshot", into = "LedgerSnapshot")]
pub struct Ledger {
    tickets: HashMap<TicketId, TicketState>,
}

impl Ledger {
    /// Create an empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tickets ever issued
    #[must_use]
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    /// True when no ticket has been issued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// Current state of a ticket, if it exists
    #[must_use]
    pub fn get(&self, id: &TicketId) -> Option<TicketState> {
        self.tickets.get(id).copied()
    }

    /// Check whether a ticket exists
    #[must_use]
    pub fn contains(&self, id: &TicketId) -> bool {
        self.tickets.contains_key(id)
    }

    /// Iterate over all tickets in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&TicketId, &TicketState)> {
        self.tickets.iter()
    }

    /// Count of `(unused, used)` tickets
    #[must_use]
    pub fn counts(&self) -> (usize, usize) {
        let used = self.tickets.values().filter(|s| s.is_used()).count();
        (self.tickets.len() - used, used)
    }

    /// Add a new unused ticket. Existing entries are never overwritten.
    ///
    /// Returns `false` when the id is already present.
    pub(crate) fn issue(&mut self, id: TicketId) -> bool {
        if self.tickets.contains_key(&id) {
            return false;
        }
        self.tickets.insert(id, TicketState::Unused);
        true
    }

    /// Attempt the `Unused → Used` transition.
    pub(crate) fn redeem(&mut self, id: &TicketId) -> Redemption {
        let Some(state) = self.tickets.get_mut(id) else {
            return Redemption::NotFound;
        };

        match state.redeem() {
            Some(next) => {
                *state = next;
                Redemption::Valid
            }
            None => Redemption::AlreadyUsed,
        }
    }
}

impl FromIterator<(TicketId, TicketState)> for Ledger {
    fn from_iter<I: IntoIterator<Item = (TicketId, TicketState)>>(iter: I) -> Self {
        Self {
            tickets: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Persisted form
// ============================================================================

/// One ticket as stored on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    /// Whether the ticket has been redeemed
    pub used: bool,
}

impl From<TicketState> for TicketRecord {
    fn from(state: TicketState) -> Self {
        Self {
            used: state.is_used(),
        }
    }
}

impl From<TicketRecord> for TicketState {
    fn from(record: TicketRecord) -> Self {
        if record.used { Self::Used } else { Self::Unused }
    }
}

/// Persisted ledger layout: `{"<uuid>": {"used": bool}}`.
///
/// Keys are kept sorted so that saving the same ledger twice produces the
/// same bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerSnapshot(pub BTreeMap<String, TicketRecord>);

/// Raised when a persisted ledger cannot be turned back into a [`Ledger`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerFormatError {
    /// A key is not a valid ticket identifier
    #[error("invalid ticket id in ledger: {0:?}")]
    InvalidTicketId(String),

    /// Two keys normalise to the same ticket id
    #[error("duplicate ticket id in ledger: {0}")]
    DuplicateTicketId(TicketId),
}

impl TryFrom<LedgerSnapshot> for Ledger {
    type Error = LedgerFormatError;

    fn try_from(snapshot: LedgerSnapshot) -> Result<Self, Self::Error> {
        let mut tickets = HashMap::with_capacity(snapshot.0.len());
        for (key, record) in snapshot.0 {
            let id = TicketId::parse(&key).ok_or(LedgerFormatError::InvalidTicketId(key))?;
            if tickets.insert(id, TicketState::from(record)).is_some() {
                return Err(LedgerFormatError::DuplicateTicketId(id));
            }
        }
        Ok(Self { tickets })
    }
}

impl From<Ledger> for LedgerSnapshot {
    fn from(ledger: Ledger) -> Self {
        Self(
            ledger
                .tickets
                .into_iter()
                .map(|(id, state)| (id.to_string(), TicketRecord::from(state)))
                .collect(),
        )
    }
}
