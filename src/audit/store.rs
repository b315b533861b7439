//! Persistence collaborator for the ledger.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::error::StoreError;
use super::types::AuditLogEntry;

/// Loads and saves the full ledger. No schema beyond [`AuditLogEntry`].
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn load(&self) -> Result<Vec<AuditLogEntry>, StoreError>;
    async fn save(&self, entries: &[AuditLogEntry]) -> Result<(), StoreError>;
}

/// JSON-on-disk store. Writes go to a sibling temp file first and are
/// renamed into place, so a crash mid-save cannot truncate the ledger.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[async_trait]
impl AuditStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<AuditLogEntry>, StoreError> {
        if !self.path.exists() {
            return Ok(vec![]);
        }

        let bytes = tokio::fs::read(&self.path).await?;
        let entries = serde_json::from_slice(&bytes)?;
        Ok(entries)
    }

    async fn save(&self, entries: &[AuditLogEntry]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(entries)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), entries = entries.len(), "ledger saved");
        Ok(())
    }
}

/// In-memory store for tests.
#[cfg(any(test, feature = "mock"))]
#[derive(Default)]
pub struct MemoryStore {
    entries: std::sync::Mutex<Vec<AuditLogEntry>>,
    saves: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "mock"))]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `save` was called.
    pub fn save_count(&self) -> usize {
        self.saves.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Entries as persisted by the last save.
    pub fn persisted(&self) -> Vec<AuditLogEntry> {
        self.entries.lock().expect("lock poisoned").clone()
    }
}

#[cfg(any(test, feature = "mock"))]
#[async_trait]
impl AuditStore for MemoryStore {
    async fn load(&self) -> Result<Vec<AuditLogEntry>, StoreError> {
        Ok(self.entries.lock().expect("lock poisoned").clone())
    }

    async fn save(&self, entries: &[AuditLogEntry]) -> Result<(), StoreError> {
        *self.entries.lock().expect("lock poisoned") = entries.to_vec();
        self.saves.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}
