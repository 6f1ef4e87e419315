//! JSON file implementation of the Ticket Store.
//!
//! The whole ledger lives in one file (`tickets.json` by default) and is
//! replaced wholesale on every save. There is no locking here; the
//! [`TicketService`](crate::TicketService) serializes all saves.

use crate::fs::write_atomic;
use std::io;
use std::path::{Path, PathBuf};
use ticketgate_core::environment::{BoxFuture, TicketRepository};
use ticketgate_core::{Ledger, RepositoryError};

/// Ticket repository backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    /// Create a repository for the ledger file at `path`.
    ///
    /// The file does not need to exist yet; the parent directory does.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the ledger file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_ledger(&self) -> Result<Ledger, RepositoryError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No ledger file yet, starting empty");
                return Ok(Ledger::new());
            },
            Err(e) => {
                return Err(RepositoryError::Read(format!("{}: {e}", self.path.display())));
            },
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Ledger::new());
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| RepositoryError::Corrupt(format!("{}: {e}", self.path.display())))
    }

    async fn write_ledger(&self, ledger: &Ledger) -> Result<(), RepositoryError> {
        let bytes = serde_json::to_vec(ledger)
            .map_err(|e| RepositoryError::Write(format!("serialize: {e}")))?;

        write_atomic(&self.path, &bytes)
            .await
            .map_err(|e| RepositoryError::Write(format!("{}: {e}", self.path.display())))?;

        tracing::trace!(path = %self.path.display(), tickets = ledger.len(), "Ledger saved");
        Ok(())
    }
}

impl TicketRepository for JsonFileRepository {
    fn load(&self) -> BoxFuture<'_, Result<Ledger, RepositoryError>> {
        Box::pin(self.read_ledger())
    }

    fn save<'a>(&'a self, ledger: &'a Ledger) -> BoxFuture<'a, Result<(), RepositoryError>> {
        Box::pin(self.write_ledger(ledger))
    }
}
