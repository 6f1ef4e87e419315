//! Error types.
//!
//! [`TicketError`] is the taxonomy callers see. The collaborator errors
//! ([`RepositoryError`], [`ArtifactError`], [`CodecError`]) describe what went
//! wrong underneath and fold into it through `From`.
//!
//! A ticket that has already been used is not an error; see
//! [`Redemption`](crate::Redemption).

use thiserror::Error;

/// Errors surfaced by ticket operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicketError {
    /// No ticket or artifact exists for the identifier
    #[error("Ticket {0} not found")]
    NotFound(String),

    /// The submitted image contained no readable code
    #[error("No QR code found in the image")]
    DecodeFailure,

    /// A required field was missing or invalid
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// The persistence medium could not be read or written
    #[error("Storage failure: {0}")]
    Io(String),
}

impl TicketError {
    /// Create a `NotFound` error for any displayable identifier
    #[must_use]
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound(id.to_string())
    }

    /// Create a `MalformedRequest` error
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRequest(reason.into())
    }
}

/// Errors from a [`TicketRepository`](crate::environment::TicketRepository).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The ledger exists but could not be read
    #[error("Failed to read ledger: {0}")]
    Read(String),

    /// The ledger could not be written
    #[error("Failed to write ledger: {0}")]
    Write(String),

    /// The ledger was read but its contents are not a valid ledger
    #[error("Ledger is corrupt: {0}")]
    Corrupt(String),
}

/// Errors from an [`ArtifactStore`](crate::environment::ArtifactStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    /// An existing artifact could not be read
    #[error("Failed to read artifact: {0}")]
    Read(String),

    /// An artifact could not be written
    #[error("Failed to write artifact: {0}")]
    Write(String),
}

/// Errors from a [`CodeCodec`](crate::environment::CodeCodec).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The text could not be rendered as a code image
    #[error("Failed to render code: {0}")]
    Render(String),

    /// The bytes are not an image the codec can read
    #[error("Unreadable image: {0}")]
    UnreadableImage(String),
}

impl From<RepositoryError> for TicketError {
    fn from(err: RepositoryError) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<ArtifactError> for TicketError {
    fn from(err: ArtifactError) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<CodecError> for TicketError {
    fn from(err: CodecError) -> Self {
        match err {
            // Rendering aborts generation like any other write failure
            CodecError::Render(_) => Self::Io(err.to_string()),
            CodecError::UnreadableImage(reason) => Self::MalformedRequest(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_errors_become_io() {
        let err: TicketError = RepositoryError::Write("disk full".into()).into();
        assert_eq!(err, TicketError::Io("Failed to write ledger: disk full".into()));
    }

    #[test]
    fn test_codec_errors_split_by_cause() {
        let render: TicketError = CodecError::Render("data too long".into()).into();
        assert!(matches!(render, TicketError::Io(_)));

        let unreadable: TicketError = CodecError::UnreadableImage("not a png".into()).into();
        assert_eq!(unreadable, TicketError::MalformedRequest("not a png".into()));
    }

    #[test]
    fn test_display() {
        assert_eq!(TicketError::not_found("abc").to_string(), "Ticket abc not found");
        assert_eq!(
            TicketError::DecodeFailure.to_string(),
            "No QR code found in the image"
        );
    }
}
