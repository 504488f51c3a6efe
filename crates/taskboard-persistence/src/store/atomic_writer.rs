use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use taskboard_core::{TaskboardError, TaskboardResult};

/// Whole-file writes through a sibling temp file and rename, so readers see
/// either the old document or the new one.
pub struct AtomicWriter;

impl AtomicWriter {
    pub async fn write_atomic(path: &Path, data: Vec<u8>) -> TaskboardResult<()> {
        let target: PathBuf = path.to_path_buf();
        let len = data.len();

        tokio::task::spawn_blocking(move || -> TaskboardResult<()> {
            // same directory keeps the rename on one filesystem
            let parent = match target.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
                _ => PathBuf::from("."),
            };
            let mut temp = tempfile::NamedTempFile::new_in(&parent)?;
            temp.write_all(&data)?;
            temp.as_file().sync_all()?;
            temp.persist(&target).map_err(|e| TaskboardError::Io(e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| TaskboardError::Persistence(format!("write task aborted: {}", e)))??;

        tracing::debug!("Atomically wrote {} bytes to {}", len, path.display());
        Ok(())
    }

    /// `None` when the file does not exist yet.
    pub async fn read_optional(path: &Path) -> TaskboardResult<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(data) => {
                tracing::debug!("Read {} bytes from {}", data.len(), path.display());
                Ok(Some(data))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
