//! Filesystem helpers shared by the file-backed stores.

use std::io;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Replace `path` with `bytes` so that readers see either the old or the new
/// contents, never a mix.
///
/// The bytes go to a hidden temporary sibling, are flushed to disk, then
/// renamed over the target. The temporary file is removed on failure.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let tmp = dir.join(format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        Uuid::new_v4().simple()
    ));

    let result = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if result.is_err() {
        // Best effort; the temp file may not exist if create failed
        let _ = tokio::fs::remove_file(&tmp).await;
    }

    result
}
