//! The ticket service.
//!
//! Orchestrates id generation, QR rendering, QR decoding and ledger
//! transitions.
//!
//! # Concurrency
//!
//! The ledger lives in memory behind one [`tokio::sync::Mutex`]. A mutation
//! runs the reducer on a copy, writes the copy through to the repository,
//! and only then replaces the in-memory ledger. The lock is held for the
//! whole sequence, so:
//!
//! - two concurrent redemptions of one ticket yield one `Valid` and one
//!   `AlreadyUsed`, never two `Valid`
//! - a failed save leaves both the file and the in-memory ledger untouched
//!
//! Rendering and decoding happen outside the lock on the blocking pool.
//!
//! Only one process may own a ledger file; nothing coordinates two
//! processes writing the same file.

use crate::metrics::TicketMetrics;
use crate::{DirectoryArtifactStore, HealthCheck, JsonFileRepository, QrCodec};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use ticketgate_core::effect::{requires_persist, Effect};
use ticketgate_core::environment::{
    ArtifactStore, CodeCodec, IdGenerator, RandomIdGenerator, TicketRepository,
};
use ticketgate_core::reducer::Reducer;
use ticketgate_core::{
    IssuedTicket, Ledger, LedgerAction, LedgerOutput, LedgerReducer, Redemption, TicketError,
    TicketId, TicketState,
};
use tokio::sync::Mutex;

/// Dependencies injected into the [`TicketService`].
#[derive(Clone)]
pub struct TicketEnvironment {
    /// Durable ledger storage
    pub repository: Arc<dyn TicketRepository>,
    /// Rendered QR images
    pub artifacts: Arc<dyn ArtifactStore>,
    /// QR encode/decode
    pub codec: Arc<dyn CodeCodec>,
    /// Ticket id source
    pub ids: Arc<dyn IdGenerator>,
}

impl TicketEnvironment {
    /// Create an environment from its parts.
    #[must_use]
    pub fn new(
        repository: Arc<dyn TicketRepository>,
        artifacts: Arc<dyn ArtifactStore>,
        codec: Arc<dyn CodeCodec>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            repository,
            artifacts,
            codec,
            ids,
        }
    }

    /// File-backed environment: JSON ledger, PNG directory, QR codec and
    /// random UUID v4 ids.
    ///
    /// # Errors
    ///
    /// Returns error if the artifact directory cannot be created.
    pub async fn production(
        ledger_path: impl Into<PathBuf>,
        artifact_dir: impl Into<PathBuf>,
        codec: QrCodec,
    ) -> Result<Self, TicketError> {
        let artifacts = DirectoryArtifactStore::open(artifact_dir).await?;
        Ok(Self::new(
            Arc::new(JsonFileRepository::new(ledger_path)),
            Arc::new(artifacts),
            Arc::new(codec),
            Arc::new(RandomIdGenerator),
        ))
    }
}

/// Result of redeeming a ticket presented as an image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannedRedemption {
    /// Text decoded from the first code in the image
    pub ticket_id: String,
    /// Outcome of redeeming that text
    pub redemption: Redemption,
}

/// The ticket service: ledger owner and operation orchestrator.
pub struct TicketService {
    ledger: Mutex<Ledger>,
    reducer: LedgerReducer,
    environment: TicketEnvironment,
    last_persist_failed: AtomicBool,
}

impl TicketService {
    /// Load the ledger from the repository and start the service.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Io`] if the persisted ledger cannot be read.
    pub async fn open(environment: TicketEnvironment) -> Result<Self, TicketError> {
        let ledger = environment.repository.load().await?;
        let (unused, used) = ledger.counts();
        tracing::info!(unused, used, "Ticket ledger loaded");
        TicketMetrics::record_ledger_size(unused, used);
        Ok(Self::with_ledger(ledger, environment))
    }

    /// Start the service with an already loaded ledger.
    #[must_use]
    pub fn with_ledger(ledger: Ledger, environment: TicketEnvironment) -> Self {
        Self {
            ledger: Mutex::new(ledger),
            reducer: LedgerReducer,
            environment,
            last_persist_failed: AtomicBool::new(false),
        }
    }

    /// Issue a new ticket and render its QR code.
    ///
    /// The code is rendered and stored before the ledger is touched, so a
    /// rendering failure never leaves a ticket without a code.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Io`] if rendering, storing the image, or saving
    /// the ledger fails. A stored image may be left behind when only the
    /// ledger save fails.
    #[tracing::instrument(skip(self))]
    pub async fn generate(&self) -> Result<IssuedTicket, TicketError> {
        let id = self.environment.ids.next_id();

        let codec = Arc::clone(&self.environment.codec);
        let text = id.to_string();
        let png = tokio::task::spawn_blocking(move || codec.encode(&text))
            .await
            .map_err(|e| TicketError::Io(format!("render task failed: {e}")))??;

        self.environment.artifacts.put(id, &png).await?;

        match self.dispatch(LedgerAction::Issue { id }).await? {
            LedgerOutput::Issued(_) => {
                tracing::info!(ticket_id = %id, "Ticket issued");
                Ok(IssuedTicket::new(id))
            },
            output => {
                tracing::error!(ticket_id = %id, ?output, "Generated id already in ledger");
                Err(TicketError::Io(format!("ticket {id} already exists")))
            },
        }
    }

    /// Fetch the rendered QR image for a ticket.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::NotFound`] if no image exists for `id`, or
    /// [`TicketError::Io`] if it cannot be read.
    pub async fn retrieve(&self, id: TicketId) -> Result<Vec<u8>, TicketError> {
        self.environment
            .artifacts
            .get(id)
            .await?
            .ok_or_else(|| TicketError::not_found(id))
    }

    /// Redeem a ticket by id.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Io`] if a valid redemption cannot be saved; the
    /// ticket then stays unused.
    #[tracing::instrument(skip(self), fields(ticket_id = %id))]
    pub async fn redeem(&self, id: TicketId) -> Result<Redemption, TicketError> {
        let output = self.dispatch(LedgerAction::Redeem { id }).await?;
        let outcome = output
            .redemption()
            .ok_or_else(|| TicketError::Io(format!("unexpected ledger output {output:?}")))?;

        tracing::info!(outcome = outcome.status(), "Redemption attempted");
        Ok(outcome)
    }

    /// Redeem whatever text was presented at the gate.
    ///
    /// Text that is not a ticket id can never have been issued, so it is
    /// reported as `NotFound` rather than as an error.
    ///
    /// # Errors
    ///
    /// See [`TicketService::redeem`].
    pub async fn redeem_code(&self, code: &str) -> Result<Redemption, TicketError> {
        match TicketId::parse(code) {
            Some(id) => self.redeem(id).await,
            None => {
                tracing::info!(code, "Presented code is not a ticket id");
                TicketMetrics::record(ticketgate_core::effect::Metric::Redeemed(
                    Redemption::NotFound,
                ));
                Ok(Redemption::NotFound)
            },
        }
    }

    /// Decode the first QR code in an image without redeeming it.
    ///
    /// # Errors
    ///
    /// - [`TicketError::MalformedRequest`] if the bytes are not an image
    /// - [`TicketError::DecodeFailure`] if the image holds no readable code
    pub async fn decode(&self, image: Vec<u8>) -> Result<String, TicketError> {
        let codec = Arc::clone(&self.environment.codec);
        let codes = tokio::task::spawn_blocking(move || codec.decode(&image))
            .await
            .map_err(|e| TicketError::Io(format!("decode task failed: {e}")))??;

        if codes.len() > 1 {
            tracing::debug!(found = codes.len(), "Several codes in image, using the first");
        }

        codes.into_iter().next().ok_or_else(|| {
            TicketMetrics::record_decode_failure();
            TicketError::DecodeFailure
        })
    }

    /// Decode an image and redeem the ticket it carries.
    ///
    /// # Errors
    ///
    /// Everything [`TicketService::decode`] and [`TicketService::redeem`]
    /// return. A missing code is `DecodeFailure`, never `NotFound`.
    pub async fn redeem_from_image(&self, image: Vec<u8>) -> Result<ScannedRedemption, TicketError> {
        let ticket_id = self.decode(image).await?;
        let redemption = self.redeem_code(&ticket_id).await?;
        Ok(ScannedRedemption {
            ticket_id,
            redemption,
        })
    }

    /// Current state of a ticket.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::NotFound`] if the ticket was never issued.
    pub async fn status(&self, id: TicketId) -> Result<TicketState, TicketError> {
        self.ledger
            .lock()
            .await
            .get(&id)
            .ok_or_else(|| TicketError::not_found(id))
    }

    /// Copy of the current ledger.
    pub async fn snapshot(&self) -> Ledger {
        self.ledger.lock().await.clone()
    }

    /// Service health: degraded while the most recent save has failed.
    pub async fn health(&self) -> HealthCheck {
        let (unused, used) = self.ledger.lock().await.counts();

        let check = if self.last_persist_failed.load(Ordering::Relaxed) {
            HealthCheck::degraded("ticket_ledger", "Last ledger save failed")
        } else {
            HealthCheck::healthy("ticket_ledger")
        };

        check
            .with_metadata("unused", unused.to_string())
            .with_metadata("used", used.to_string())
    }

    /// Run one action through the reducer and execute its effects.
    async fn dispatch(&self, action: LedgerAction) -> Result<LedgerOutput, TicketError> {
        let mut ledger = self.ledger.lock().await;

        let mut next = ledger.clone();
        let (output, effects) = self.reducer.reduce(&mut next, action);

        if requires_persist(&effects) {
            let started = Instant::now();
            if let Err(err) = self.environment.repository.save(&next).await {
                self.last_persist_failed.store(true, Ordering::Relaxed);
                TicketMetrics::record_persist_failure();
                tracing::error!(error = %err, ?action, "Ledger save failed, transition rolled back");
                return Err(err.into());
            }
            self.last_persist_failed.store(false, Ordering::Relaxed);
            TicketMetrics::record_persist(started.elapsed());

            *ledger = next;
            let (unused, used) = ledger.counts();
            TicketMetrics::record_ledger_size(unused, used);
        }
        drop(ledger);

        for effect in effects {
            if let Effect::Metric(metric) = effect {
                TicketMetrics::record(metric);
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use ticketgate_testing::mocks::{
        FakeCodec, InMemoryArtifactStore, InMemoryTicketRepository, SequentialIdGenerator,
    };

    fn service_with(repository: Arc<InMemoryTicketRepository>) -> TicketService {
        let env = TicketEnvironment::new(
            repository,
            Arc::new(InMemoryArtifactStore::new()),
            Arc::new(FakeCodec::default()),
            Arc::new(SequentialIdGenerator::new()),
        );
        TicketService::with_ledger(Ledger::new(), env)
    }

    #[tokio::test]
    async fn test_generate_persists_unused_ticket() {
        let repo = Arc::new(InMemoryTicketRepository::new());
        let service = service_with(Arc::clone(&repo));

        let issued = service.generate().await.unwrap();

        assert_eq!(issued.reference, format!("/download/{}", issued.id));
        assert_eq!(repo.stored().get(&issued.id), Some(TicketState::Unused));
        assert_eq!(service.status(issued.id).await.unwrap(), TicketState::Unused);
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back() {
        let repo = Arc::new(InMemoryTicketRepository::new());
        let service = service_with(Arc::clone(&repo));
        let issued = service.generate().await.unwrap();

        repo.fail_saves(true);
        let err = service.redeem(issued.id).await.unwrap_err();
        assert!(matches!(err, TicketError::Io(_)));
        assert_eq!(service.status(issued.id).await.unwrap(), TicketState::Unused);
        assert_eq!(repo.stored().get(&issued.id), Some(TicketState::Unused));
        assert_eq!(
            service.health().await.status,
            crate::HealthStatus::Degraded
        );

        repo.fail_saves(false);
        assert_eq!(service.redeem(issued.id).await.unwrap(), Redemption::Valid);
        assert!(service.health().await.status.is_healthy());
    }

    #[tokio::test]
    async fn test_redeem_code_that_is_not_an_id() {
        let service = service_with(Arc::new(InMemoryTicketRepository::new()));
        assert_eq!(
            service.redeem_code("hello world").await.unwrap(),
            Redemption::NotFound
        );
    }

    #[tokio::test]
    async fn test_health_reports_counts() {
        let service = service_with(Arc::new(InMemoryTicketRepository::new()));
        let first = service.generate().await.unwrap();
        service.generate().await.unwrap();
        service.redeem(first.id).await.unwrap();

        let health = service.health().await;
        assert!(health.metadata.contains(&("unused".to_string(), "1".to_string())));
        assert!(health.metadata.contains(&("used".to_string(), "1".to_string())));
    }
}
