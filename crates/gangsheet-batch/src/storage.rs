//! # Storage Backends
//!
//! Ready-made collaborators for single-process use:
//!
//! - [`LocalObjectStore`] - object keys as paths under a root directory
//! - [`MemoryStore`] - queue snapshot plus batch sheets held in memory
//!
//! Both back the `gangsheet generate` command and the service tests.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use gangsheet_core::assembly::ItemClaim;
use gangsheet_core::{BatchSheet, BatchStatus, QueueItem};

use crate::collaborators::{BatchStore, ObjectStore, QueueSource};
use crate::error::{BatchError, BatchResult};

// =============================================================================
// Local Object Store
// =============================================================================

/// Filesystem-backed object store.
///
/// `batches/1700000000000-batch.png` lives at
/// `<root>/batches/1700000000000-batch.png`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalObjectStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a key to a path, refusing anything that escapes the root.
    fn resolve(&self, key: &str) -> BatchResult<PathBuf> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain {
            return Err(BatchError::Storage(format!("Invalid object key: {key}")));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn get(&self, key: &str) -> BatchResult<Vec<u8>> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BatchError::ObjectNotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> BatchResult<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        debug!(key, content_type, size = bytes.len(), "Writing object");
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }
}

// =============================================================================
// Memory Store
// =============================================================================

/// In-memory queue and batch sheet store.
///
/// Lock order is always queue, then batches.
#[derive(Debug, Default)]
pub struct MemoryStore {
    queue: RwLock<Vec<QueueItem>>,
    batches: RwLock<Vec<BatchSheet>>,
}

impl MemoryStore {
    pub fn new(queue: Vec<QueueItem>) -> Self {
        MemoryStore {
            queue: RwLock::new(queue),
            batches: RwLock::new(Vec::new()),
        }
    }

    /// Adds an item to the end of the unbatched queue.
    pub async fn enqueue(&self, item: QueueItem) {
        self.queue.write().await.push(item);
    }
}

#[async_trait]
impl QueueSource for MemoryStore {
    async fn unbatched_items(&self) -> BatchResult<Vec<QueueItem>> {
        Ok(self.queue.read().await.clone())
    }
}

#[async_trait]
impl BatchStore for MemoryStore {
    async fn save_batch(&self, sheet: &BatchSheet, claims: &[ItemClaim]) -> BatchResult<()> {
        let mut queue = self.queue.write().await;
        let mut batches = self.batches.write().await;

        if batches.iter().any(|b| b.id == sheet.id) {
            return Err(BatchError::Storage(format!("Batch {} already exists", sheet.id)));
        }

        for claim in claims {
            if claim.is_complete() {
                queue.retain(|item| item.id != claim.item_id);
            } else if let Some(item) = queue.iter_mut().find(|item| item.id == claim.item_id) {
                item.qty -= claim.placed_units;
            }
        }
        batches.push(sheet.clone());
        Ok(())
    }

    async fn load_batch(&self, id: &str) -> BatchResult<Option<BatchSheet>> {
        Ok(self.batches.read().await.iter().find(|b| b.id == id).cloned())
    }

    async fn list_batches(&self) -> BatchResult<Vec<BatchSheet>> {
        let mut batches = self.batches.read().await.clone();
        batches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(batches)
    }

    async fn set_status(&self, id: &str, status: BatchStatus) -> BatchResult<()> {
        let mut batches = self.batches.write().await;
        let sheet = batches
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| BatchError::BatchNotFound(id.to_string()))?;
        sheet.status = status;
        Ok(())
    }

    async fn set_notes(&self, id: &str, notes: Option<String>) -> BatchResult<()> {
        let mut batches = self.batches.write().await;
        let sheet = batches
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| BatchError::BatchNotFound(id.to_string()))?;
        sheet.notes = notes;
        Ok(())
    }
}
