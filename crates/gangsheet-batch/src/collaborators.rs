//! # Collaborator Traits
//!
//! The seams between [`BatchService`](crate::service::BatchService) and the
//! outside world. Production wires real storage; tests wire fakes.
//!
//! ```text
//!                    ┌──────────────┐
//!                    │ BatchService │
//!                    └──────┬───────┘
//!        ┌──────────────┬───┴──────────┬──────────────┐
//!        ▼              ▼              ▼              ▼
//!  ┌───────────┐ ┌─────────────┐ ┌────────────┐ ┌────────────┐
//!  │QueueSource│ │ ObjectStore │ │ Compositor │ │ BatchStore │
//!  │ snapshot  │ │ get / put   │ │ plan → PNG │ │ sheets +   │
//!  │           │ │ bytes       │ │            │ │ claims     │
//!  └───────────┘ └─────────────┘ └────────────┘ └────────────┘
//! ```
//!
//! All are carried as `Arc<dyn Trait>`.

use std::collections::HashMap;

use async_trait::async_trait;

use gangsheet_core::assembly::ItemClaim;
use gangsheet_core::raster::RasterPlan;
use gangsheet_core::{BatchSheet, BatchStatus, QueueItem};

use crate::error::BatchResult;

/// Source of queue items that are not yet on any batch sheet.
#[async_trait]
pub trait QueueSource: Send + Sync {
    /// One consistent snapshot of the unbatched queue, oldest first.
    async fn unbatched_items(&self) -> BatchResult<Vec<QueueItem>>;
}

/// Blob storage for uploaded artwork and rendered sheets.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Reads the object under `key`.
    ///
    /// Returns `BatchError::ObjectNotFound` when there is none.
    async fn get(&self, key: &str) -> BatchResult<Vec<u8>>;

    /// Writes `bytes` under `key`, replacing any existing object.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> BatchResult<()>;
}

/// Renders a raster plan into an encoded image.
#[async_trait]
pub trait Compositor: Send + Sync {
    /// Draws every layer of `plan` onto a transparent canvas.
    ///
    /// `sources` maps each layer's source key to the raw uploaded bytes.
    async fn composite(
        &self,
        plan: &RasterPlan,
        sources: &HashMap<String, Vec<u8>>,
    ) -> BatchResult<Vec<u8>>;
}

/// Persistence for batch sheets and the queue claims that go with them.
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Saves a new sheet and applies its claims in one transaction.
    ///
    /// A complete claim takes the item off the unbatched queue; a partial
    /// one leaves the remaining units queued.
    async fn save_batch(&self, sheet: &BatchSheet, claims: &[ItemClaim]) -> BatchResult<()>;

    /// Loads one sheet, `None` if the id is unknown.
    async fn load_batch(&self, id: &str) -> BatchResult<Option<BatchSheet>>;

    /// All sheets, newest first.
    async fn list_batches(&self) -> BatchResult<Vec<BatchSheet>>;

    /// Overwrites the status of an existing sheet.
    async fn set_status(&self, id: &str, status: BatchStatus) -> BatchResult<()>;

    /// Overwrites the notes of an existing sheet.
    async fn set_notes(&self, id: &str, notes: Option<String>) -> BatchResult<()>;
}
