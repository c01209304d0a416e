//! File-backed JSON documents with atomic replacement on save.

use crate::error::{MotionError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// A single JSON document on disk, typed as `T`.
///
/// A missing file reads as `T::default()`. Saving writes a sibling temporary
/// file and renames it over the target, so readers never observe a partially
/// written document.
#[derive(Debug)]
pub struct JsonDocument<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonDocument<T> {
    fn clone(&self) -> Self {
        Self::new(self.path.clone())
    }
}

impl<T> JsonDocument<T> {
    /// Creates a handle for the document at `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Reads and parses the document.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::StorageRead`] when the file exists but cannot be
    /// read or does not parse as `T`.
    pub async fn load(&self) -> Result<T> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| MotionError::storage_read(&self.path, "malformed JSON document", e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "document missing, using defaults");
                Ok(T::default())
            }
            Err(e) => Err(MotionError::storage_read(
                &self.path,
                "document is unreadable",
                e,
            )),
        }
    }

    /// Serializes `value` and atomically replaces the document with it.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::StorageWrite`] if serialization, the temporary
    /// file write or the final rename fails. The previous document is left
    /// intact in every failure case.
    pub async fn save(&self, value: &T) -> Result<()> {
        let mut bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| MotionError::storage_write(&self.path, "serialization failed", e))?;
        bytes.push(b'\n');
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_file_atomically(&path, &bytes))
            .await
            .map_err(|e| MotionError::storage_write(&self.path, "writer task failed", e))?
    }
}

/// Replaces the file at `path` with `bytes` through a temporary file in the
/// same directory. Blocking; call from `spawn_blocking` in async code.
///
/// # Errors
///
/// Returns [`MotionError::StorageWrite`] when any step fails.
pub fn write_file_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    std::fs::create_dir_all(dir)
        .map_err(|e| MotionError::storage_write(path, "cannot create parent directory", e))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| MotionError::storage_write(path, "cannot create temporary file", e))?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| MotionError::storage_write(path, "temporary file write failed", e))?;
    tmp.persist(path)
        .map_err(|e| MotionError::storage_write(path, "rename into place failed", e.error))?;

    Ok(())
}
