//! In-memory collaborators for fast, deterministic service tests
//!
//! - [`InMemoryTicketRepository`]: ledger storage with injectable save failures
//! - [`InMemoryArtifactStore`]: `HashMap`-based image storage
//! - [`FakeCodec`]: reversible text-to-bytes codec, no real QR work
//! - [`SequentialIdGenerator`]: predictable ticket ids

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Locks only panic when poisoned by a failed test

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use ticketgate_core::environment::{
    ArtifactStore, BoxFuture, CodeCodec, IdGenerator, TicketRepository,
};
use ticketgate_core::{ArtifactError, CodecError, Ledger, RepositoryError, TicketId};
use uuid::Uuid;

/// In-memory ticket repository.
///
/// Clones share storage, so a test can keep one handle and give another to
/// the service.
///
/// # Example
///
/// ```
/// use ticketgate_core::environment::TicketRepository;
/// use ticketgate_core::Ledger;
/// use ticketgate_testing::mocks::InMemoryTicketRepository;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let repo = InMemoryTicketRepository::new();
/// repo.save(&Ledger::new()).await?;
/// assert_eq!(repo.save_count(), 1);
///
/// repo.fail_saves(true);
/// assert!(repo.save(&Ledger::new()).await.is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryTicketRepository {
    ledger: Arc<RwLock<Ledger>>,
    fail_saves: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl InMemoryTicketRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository that already holds `ledger`
    #[must_use]
    pub fn with_ledger(ledger: Ledger) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            ..Self::default()
        }
    }

    /// Make every following save fail (or succeed again)
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// The ledger as last saved
    #[must_use]
    pub fn stored(&self) -> Ledger {
        self.ledger.read().unwrap().clone()
    }

    /// Number of successful saves
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl TicketRepository for InMemoryTicketRepository {
    fn load(&self) -> BoxFuture<'_, Result<Ledger, RepositoryError>> {
        Box::pin(async move { Ok(self.stored()) })
    }

    fn save<'a>(&'a self, ledger: &'a Ledger) -> BoxFuture<'a, Result<(), RepositoryError>> {
        Box::pin(async move {
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(RepositoryError::Write("injected failure".to_string()));
            }
            *self.ledger.write().unwrap() = ledger.clone();
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}

/// In-memory artifact store.
#[derive(Clone, Debug, Default)]
pub struct InMemoryArtifactStore {
    images: Arc<RwLock<HashMap<TicketId, Vec<u8>>>>,
}

impl InMemoryArtifactStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored images
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.read().unwrap().len()
    }

    /// True when nothing has been stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArtifactStore for InMemoryArtifactStore {
    fn put<'a>(&'a self, id: TicketId, image: &'a [u8]) -> BoxFuture<'a, Result<(), ArtifactError>> {
        Box::pin(async move {
            self.images.write().unwrap().insert(id, image.to_vec());
            Ok(())
        })
    }

    fn get(&self, id: TicketId) -> BoxFuture<'_, Result<Option<Vec<u8>>, ArtifactError>> {
        Box::pin(async move { Ok(self.images.read().unwrap().get(&id).cloned()) })
    }
}

/// Codec that "renders" text as `FAKE:<text>` bytes.
///
/// Decoding returns the text after the prefix. Bytes starting with `BLANK`
/// are a readable image without a code; anything else is unreadable. The
/// [`FakeCodec::failing`] variant refuses to render.
#[derive(Clone, Copy, Debug, Default)]
pub struct FakeCodec {
    fail_render: bool,
}

impl FakeCodec {
    /// Marker every encoded "image" starts with
    pub const PREFIX: &'static [u8] = b"FAKE:";

    /// Bytes of an image that holds no code
    pub const BLANK: &'static [u8] = b"BLANK";

    /// Codec whose `encode` always fails
    #[must_use]
    pub const fn failing() -> Self {
        Self { fail_render: true }
    }

    /// Image bytes carrying `text`, as `encode` would produce them
    #[must_use]
    pub fn image_of(text: &str) -> Vec<u8> {
        [Self::PREFIX, text.as_bytes()].concat()
    }
}

impl CodeCodec for FakeCodec {
    fn encode(&self, text: &str) -> Result<Vec<u8>, CodecError> {
        if self.fail_render {
            return Err(CodecError::Render("injected failure".to_string()));
        }
        Ok(Self::image_of(text))
    }

    fn decode(&self, image: &[u8]) -> Result<Vec<String>, CodecError> {
        if image.starts_with(Self::BLANK) {
            return Ok(Vec::new());
        }
        image
            .strip_prefix(Self::PREFIX)
            .map(|text| vec![String::from_utf8_lossy(text).into_owned()])
            .ok_or_else(|| CodecError::UnreadableImage("not a fake image".to_string()))
    }
}

/// Id generator yielding `00000000-0000-0000-0000-000000000001`, `...02`, ...
///
/// Real UUIDs are random, so these are still valid ticket ids.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Start the sequence at 1
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Start the sequence at `first`
    #[must_use]
    pub const fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> TicketId {
        TicketId::from_uuid(Uuid::from_u128(u128::from(
            self.next.fetch_add(1, Ordering::SeqCst),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIdGenerator::new();
        assert_eq!(
            ids.next_id().to_string(),
            "00000000-0000-0000-0000-000000000001"
        );
        assert_eq!(
            ids.next_id().to_string(),
            "00000000-0000-0000-0000-000000000002"
        );
    }

    #[test]
    fn test_fake_codec_round_trip() {
        let codec = FakeCodec::default();
        let image = codec.encode("abc").unwrap();
        assert_eq!(codec.decode(&image).unwrap(), vec!["abc".to_string()]);
        assert!(codec.decode(FakeCodec::BLANK).unwrap().is_empty());
        assert!(codec.decode(b"junk").is_err());
        assert!(FakeCodec::failing().encode("abc").is_err());
    }

    #[tokio::test]
    async fn test_repository_clones_share_storage() {
        let repo = InMemoryTicketRepository::new();
        let handle = repo.clone();
        let ledger: Ledger = [(TicketId::new(), ticketgate_core::TicketState::Unused)]
            .into_iter()
            .collect();

        repo.save(&ledger).await.unwrap();
        assert_eq!(handle.stored(), ledger);
        assert_eq!(handle.save_count(), 1);
    }

    #[tokio::test]
    async fn test_artifact_store() {
        let store = InMemoryArtifactStore::new();
        let id = TicketId::new();
        assert!(store.is_empty());

        store.put(id, b"img").await.unwrap();
        assert_eq!(store.get(id).await.unwrap(), Some(b"img".to_vec()));
        assert_eq!(store.get(TicketId::new()).await.unwrap(), None);
    }
}
