//! Ticket identifiers, redemption state and redemption outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a ticket
///
/// A random 128-bit UUID v4. Collisions are negligible, so issuing a ticket
/// never has to consult the ledger for uniqueness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Creates a new random `TicketId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `TicketId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parse scanned or submitted text into a ticket id.
    ///
    /// Surrounding whitespace is ignored. Returns `None` for anything that is
    /// not a UUID, which callers treat as an unknown ticket.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        Uuid::parse_str(text.trim()).ok().map(Self)
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for TicketId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

// ============================================================================
// State
// ============================================================================

/// Redemption state of a single ticket.
///
/// `Unused` is the only initial state and `Used` is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketState {
    /// Issued and not yet redeemed
    #[default]
    Unused,
    /// Redeemed; never changes again
    Used,
}

impl TicketState {
    /// Check if the ticket has been redeemed
    #[must_use]
    pub const fn is_used(self) -> bool {
        matches!(self, Self::Used)
    }

    /// The single permitted transition.
    ///
    /// Returns the next state, or `None` when the ticket is already `Used`.
    #[must_use]
    pub const fn redeem(self) -> Option<Self> {
        match self {
            Self::Unused => Some(Self::Used),
            Self::Used => None,
        }
    }

    /// Lowercase name as used on the wire
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unused => "unused",
            Self::Used => "used",
        }
    }
}

impl fmt::Display for TicketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Outcome of a redemption attempt.
///
/// All three are ordinary business results, not failures. Turning away a
/// reused ticket at the door is expected traffic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Redemption {
    /// Ticket existed and was unused; it is now used
    Valid,
    /// Ticket existed but had already been redeemed
    AlreadyUsed,
    /// No ticket with this identifier was ever issued
    NotFound,
}

impl Redemption {
    /// Status string reported to clients: `valid`, `used` or `invalid`.
    #[must_use]
    pub const fn status(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::AlreadyUsed => "used",
            Self::NotFound => "invalid",
        }
    }

    /// Human readable message reported alongside the status.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Valid => "Ticket confirmed!",
            Self::AlreadyUsed => "Ticket has already been used.",
            Self::NotFound => "Ticket not found.",
        }
    }
}

impl fmt::Display for Redemption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status())
    }
}

/// A freshly issued ticket and the path its QR artifact is served from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedTicket {
    /// The new ticket's identifier
    pub id: TicketId,
    /// Retrieval reference for the rendered code
    pub reference: String,
}

impl IssuedTicket {
    /// Build the issued ticket record for `id`.
    #[must_use]
    pub fn new(id: TicketId) -> Self {
        Self {
            id,
            reference: download_reference(id),
        }
    }
}

/// Path under which the rendered code for `id` can be downloaded.
#[must_use]
pub fn download_reference(id: TicketId) -> String {
    format!("/download/{id}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_id_display_is_canonical() {
        let uuid = Uuid::parse_str("936DA01F-9ABD-4D9D-80C7-02AF85C822A8").unwrap();
        let id = TicketId::from_uuid(uuid);
        assert_eq!(id.to_string(), "936da01f-9abd-4d9d-80c7-02af85c822a8");
    }

    #[test]
    fn test_ticket_id_parse() {
        let id = TicketId::new();
        assert_eq!(TicketId::parse(&id.to_string()), Some(id));
        assert_eq!(TicketId::parse(&format!("  {id}\n")), Some(id));
        assert_eq!(TicketId::parse("not-a-ticket"), None);
        assert_eq!(TicketId::parse(""), None);
    }

    #[test]
    fn test_state_transition_is_one_way() {
        assert_eq!(TicketState::Unused.redeem(), Some(TicketState::Used));
        assert_eq!(TicketState::Used.redeem(), None);
        assert_eq!(TicketState::default(), TicketState::Unused);
    }

    #[test]
    fn test_redemption_status_strings() {
        assert_eq!(Redemption::Valid.status(), "valid");
        assert_eq!(Redemption::AlreadyUsed.status(), "used");
        assert_eq!(Redemption::NotFound.status(), "invalid");
    }

    #[test]
    fn test_issued_ticket_reference() {
        let id = TicketId::new();
        let issued = IssuedTicket::new(id);
        assert_eq!(issued.reference, format!("/download/{id}"));
    }
}
