//! Key-value backends: the storage medium under the record store.
//!
//! Values are opaque strings. The store keeps its whole collection under one
//! key, so every write replaces a complete value.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::BackendError;

#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// Value stored under `key`, or `None` if nothing was ever written.
    async fn get_item(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Replace the value under `key`. Either the full value lands or the
    /// previous one is left in place.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), BackendError>;

    /// Remove `key`. Removing a missing key succeeds.
    async fn remove_item(&self, key: &str) -> Result<(), BackendError>;
}

// ── In-memory ──

/// Process-local backend. Used as the test fake and for ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend pre-seeded with one raw value.
    pub fn with_item(key: &str, value: &str) -> Self {
        let mut items = HashMap::new();
        items.insert(key.to_string(), value.to_string());
        Self {
            items: Mutex::new(items),
        }
    }

    /// Raw value under `key`, bypassing the async interface.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    async fn get_item(&self, key: &str) -> Result<Option<String>, BackendError> {
        let items = self.items.lock().map_err(|_| BackendError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), BackendError> {
        let mut items = self.items.lock().map_err(|_| BackendError::Poisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), BackendError> {
        let mut items = self.items.lock().map_err(|_| BackendError::Poisoned)?;
        items.remove(key);
        Ok(())
    }
}

// ── File-backed ──

/// One JSON file per key inside a data directory.
///
/// Writes go through a temp file in the same directory which is then renamed
/// over the target, so readers see either the old value or the new one.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open (creating if needed) a data directory.
    pub async fn open(dir: &Path) -> Result<Self, BackendError> {
        tokio::fs::create_dir_all(dir).await?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the value for `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, BackendError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(BackendError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueBackend for FileBackend {
    async fn get_item(&self, key: &str) -> Result<Option<String>, BackendError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => {
                debug!(path = %path.display(), bytes = value.len(), "read item");
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), BackendError> {
        let target = self.path_for(key)?;
        let dir = self.dir.clone();
        let value = value.to_owned();

        tokio::task::spawn_blocking(move || -> Result<(), BackendError> {
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(value.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&target).map_err(|e| BackendError::Io(e.error))?;
            debug!(path = %target.display(), bytes = value.len(), "wrote item");
            Ok(())
        })
        .await
        .map_err(|e| BackendError::Unavailable(format!("write task failed: {e}")))?
    }

    async fn remove_item(&self, key: &str) -> Result<(), BackendError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Backend that reads from memory but rejects every write.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ReadOnlyBackend {
    pub inner: MemoryBackend,
}

#[cfg(test)]
#[async_trait]
impl KeyValueBackend for ReadOnlyBackend {
    async fn get_item(&self, key: &str) -> Result<Option<String>, BackendError> {
        self.inner.get_item(key).await
    }

    async fn set_item(&self, _key: &str, _value: &str) -> Result<(), BackendError> {
        Err(BackendError::Unavailable("storage is read-only".into()))
    }

    async fn remove_item(&self, _key: &str) -> Result<(), BackendError> {
        Err(BackendError::Unavailable("storage is read-only".into()))
    }
}

/// Backend whose reads always fail; writes go to memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct UnreadableBackend {
    pub inner: MemoryBackend,
}

#[cfg(test)]
#[async_trait]
impl KeyValueBackend for UnreadableBackend {
    async fn get_item(&self, _key: &str) -> Result<Option<String>, BackendError> {
        Err(BackendError::Unavailable("storage is offline".into()))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.inner.set_item(key, value).await
    }

    async fn remove_item(&self, key: &str) -> Result<(), BackendError> {
        self.inner.remove_item(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_set_get_remove() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get_item("k").await.unwrap(), None);

        backend.set_item("k", "[1]").await.unwrap();
        assert_eq!(backend.get_item("k").await.unwrap().as_deref(), Some("[1]"));

        backend.remove_item("k").await.unwrap();
        assert_eq!(backend.get_item("k").await.unwrap(), None);
        // Removing again is fine.
        backend.remove_item("k").await.unwrap();
    }

    #[tokio::test]
    async fn file_open_creates_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("data");
        assert!(!dir.exists());

        let backend = FileBackend::open(&dir).await.unwrap();
        assert!(dir.is_dir());
        assert_eq!(backend.dir(), dir.as_path());
    }

    #[tokio::test]
    async fn file_missing_key_is_none() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = FileBackend::open(tmp.path()).await.unwrap();
        assert_eq!(backend.get_item("maintenanceRecords").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_write_then_reopen() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = FileBackend::open(tmp.path()).await.unwrap();
        backend.set_item("maintenanceRecords", "[]").await.unwrap();
        backend
            .set_item("maintenanceRecords", r#"[{"id":1}]"#)
            .await
            .unwrap();
        drop(backend);

        let backend = FileBackend::open(tmp.path()).await.unwrap();
        assert_eq!(
            backend.get_item("maintenanceRecords").await.unwrap().as_deref(),
            Some(r#"[{"id":1}]"#)
        );
        assert!(tmp.path().join("maintenanceRecords.json").exists());

        // Only the target file remains; the temp file was renamed away.
        let entries = std::fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn file_remove_missing_is_ok() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = FileBackend::open(tmp.path()).await.unwrap();
        backend.remove_item("maintenanceRecords").await.unwrap();

        backend.set_item("maintenanceRecords", "[]").await.unwrap();
        backend.remove_item("maintenanceRecords").await.unwrap();
        assert!(!tmp.path().join("maintenanceRecords.json").exists());
    }

    #[tokio::test]
    async fn file_rejects_path_like_keys() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = FileBackend::open(tmp.path()).await.unwrap();
        for key in ["", "../escape", "a/b", "a.b"] {
            let result = backend.set_item(key, "x").await;
            assert!(
                matches!(result, Err(BackendError::InvalidKey(_))),
                "{key:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn read_only_rejects_writes() {
        let backend = ReadOnlyBackend::default();
        let result = backend.set_item("k", "v").await;
        assert!(matches!(result, Err(BackendError::Unavailable(_))));
    }
}
