//! Directory of rendered QR images, one `<ticket id>.png` per ticket.

use crate::fs::write_atomic;
use std::io;
use std::path::{Path, PathBuf};
use ticketgate_core::environment::{ArtifactStore, BoxFuture};
use ticketgate_core::{ArtifactError, TicketId};

/// Artifact store backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryArtifactStore {
    dir: PathBuf,
}

impl DirectoryArtifactStore {
    /// Open the store, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, ArtifactError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ArtifactError::Write(format!("{}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    /// Directory holding the images
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File the artifact for `id` is stored in
    #[must_use]
    pub fn path_for(&self, id: TicketId) -> PathBuf {
        self.dir.join(format!("{id}.png"))
    }
}

impl ArtifactStore for DirectoryArtifactStore {
    fn put<'a>(&'a self, id: TicketId, image: &'a [u8]) -> BoxFuture<'a, Result<(), ArtifactError>> {
        Box::pin(async move {
            let path = self.path_for(id);
            write_atomic(&path, image)
                .await
                .map_err(|e| ArtifactError::Write(format!("{}: {e}", path.display())))
        })
    }

    fn get(&self, id: TicketId) -> BoxFuture<'_, Result<Option<Vec<u8>>, ArtifactError>> {
        Box::pin(async move {
            let path = self.path_for(id);
            match tokio::fs::read(&path).await {
                Ok(bytes) => Ok(Some(bytes)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(ArtifactError::Read(format!("{}: {e}", path.display()))),
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_creates_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("qr_codes");

        let store = DirectoryArtifactStore::open(&dir).await.unwrap();
        assert!(store.dir().is_dir());
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let root = tempfile::tempdir().unwrap();
        let store = DirectoryArtifactStore::open(root.path()).await.unwrap();
        let id = TicketId::new();

        store.put(id, b"png-bytes").await.unwrap();

        assert_eq!(store.get(id).await.unwrap(), Some(b"png-bytes".to_vec()));
        assert!(store.path_for(id).ends_with(format!("{id}.png")));
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let root = tempfile::tempdir().unwrap();
        let store = DirectoryArtifactStore::open(root.path()).await.unwrap();

        assert_eq!(store.get(TicketId::new()).await.unwrap(), None);
    }
}
