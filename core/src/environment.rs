//! Environment module - dependency injection traits
//!
//! All collaborators of the ticket service are abstracted behind these traits
//! and injected at construction time:
//!
//! - [`TicketRepository`]: durable `id → state` mapping (the Ticket Store)
//! - [`ArtifactStore`]: rendered code images, keyed by ticket id
//! - [`CodeCodec`]: text ⇄ QR image
//! - [`IdGenerator`]: fresh ticket identifiers
//!
//! Production implementations live in `ticketgate-runtime`, in-memory ones in
//! `ticketgate-testing`.
//!
//! # Dyn Compatibility
//!
//! The async traits return `Pin<Box<dyn Future>>` instead of using `async fn`
//! so the service can hold them as `Arc<dyn Trait>`.

use crate::error::{ArtifactError, CodecError, RepositoryError};
use crate::ledger::Ledger;
use crate::ticket::TicketId;
use std::future::Future;
use std::pin::Pin;

/// Boxed, sendable future returned by the async environment traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Durable storage for the whole ledger.
///
/// There is deliberately no partial-update API: every mutation is
/// load-entire, mutate in memory, save-entire. Callers must serialize
/// mutations themselves; the repository performs no locking.
pub trait TicketRepository: Send + Sync {
    /// Load the persisted ledger.
    ///
    /// Returns an empty ledger when nothing has been persisted yet.
    ///
    /// # Errors
    ///
    /// Returns error if existing state cannot be read or parsed.
    fn load(&self) -> BoxFuture<'_, Result<Ledger, RepositoryError>>;

    /// Replace the persisted ledger with `ledger`.
    ///
    /// Implementations must not leave a partially written ledger behind when
    /// this fails.
    ///
    /// # Errors
    ///
    /// Returns error if the medium cannot be written.
    fn save<'a>(&'a self, ledger: &'a Ledger) -> BoxFuture<'a, Result<(), RepositoryError>>;
}

/// Storage for rendered code images.
///
/// Artifacts are write-once, read-many. Readers must never observe a
/// partially written image.
pub trait ArtifactStore: Send + Sync {
    /// Store the image for `id`.
    ///
    /// # Errors
    ///
    /// Returns error if the image cannot be written.
    fn put<'a>(&'a self, id: TicketId, image: &'a [u8]) -> BoxFuture<'a, Result<(), ArtifactError>>;

    /// Fetch the image for `id`, or `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns error if an existing image cannot be read.
    fn get(&self, id: TicketId) -> BoxFuture<'_, Result<Option<Vec<u8>>, ArtifactError>>;
}

/// Optical code codec.
///
/// Both operations are CPU-bound and synchronous; the runtime moves them off
/// the async executor.
pub trait CodeCodec: Send + Sync {
    /// Render `text` as an encoded image (PNG bytes).
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Render`] if the text cannot be encoded.
    fn encode(&self, text: &str) -> Result<Vec<u8>, CodecError>;

    /// Decode every code found in `image`, in scan order.
    ///
    /// Returns an empty list when the image is readable but holds no code.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnreadableImage`] if the bytes are not an image.
    fn decode(&self, image: &[u8]) -> Result<Vec<String>, CodecError>;
}

/// Source of fresh ticket identifiers.
pub trait IdGenerator: Send + Sync {
    /// Produce a new identifier
    fn next_id(&self) -> TicketId;
}

/// Production id generator - random UUID v4
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> TicketId {
        TicketId::new()
    }
}
