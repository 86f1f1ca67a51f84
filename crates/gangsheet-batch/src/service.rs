//! # Batch Service
//!
//! Orchestrates one batch run from queue snapshot to persisted sheet, plus
//! the sheet lifecycle afterwards.
//!
//! ## Generation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        BatchService::generate                           │
//! │                                                                         │
//! │  1. try_lock single-flight guard ──── held? ──► AlreadyRunning          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  2. QueueSource snapshot ──► plan_batch (sync, to completion)          │
//! │           │                       └── nothing placed ──► NothingToBatch │
//! │           ▼                                                             │
//! │  3. RasterPlan ──► fetch sources (buffer_unordered, per-fetch timeout) │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  4. Compositor ──► ObjectStore.put("<prefix>/<millis>-batch.png")      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  5. BatchStore.save_batch(sheet GENERATED, claims)                     │
//! │                                                                         │
//! │  Nothing is persisted until every step before it succeeded.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use gangsheet_core::assembly::{plan_batch, BatchFilter, ItemClaim};
use gangsheet_core::raster::RasterPlan;
use gangsheet_core::{BatchSheet, BatchStatus, CoreError};

use crate::collaborators::{BatchStore, Compositor, ObjectStore, QueueSource};
use crate::config::BatchConfig;
use crate::error::{BatchError, BatchResult};

// =============================================================================
// Generation Report
// =============================================================================

/// Outcome of a successful generation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedBatch {
    pub sheet: BatchSheet,
    pub claims: Vec<ItemClaim>,
    /// Units that did not fit and stay queued for the next run.
    pub unplaced_labels: Vec<String>,
    /// Units without a source image.
    pub skipped_labels: Vec<String>,
    /// Units wider than the printable width.
    pub oversized_labels: Vec<String>,
}

// =============================================================================
// Batch Service
// =============================================================================

/// Batch generation and lifecycle service.
pub struct BatchService {
    config: Arc<BatchConfig>,
    queue: Arc<dyn QueueSource>,
    objects: Arc<dyn ObjectStore>,
    compositor: Arc<dyn Compositor>,
    store: Arc<dyn BatchStore>,

    /// Held for the whole of a generation run.
    generation: Mutex<()>,
}

impl BatchService {
    pub fn new(
        config: BatchConfig,
        queue: Arc<dyn QueueSource>,
        objects: Arc<dyn ObjectStore>,
        compositor: Arc<dyn Compositor>,
        store: Arc<dyn BatchStore>,
    ) -> Self {
        BatchService {
            config: Arc::new(config),
            queue,
            objects,
            compositor,
            store,
            generation: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Packs, renders, uploads and records one batch sheet.
    ///
    /// ## Errors
    /// - `AlreadyRunning` if another run is in flight (nothing is queued)
    /// - `NothingToBatch` if no selected item fits
    /// - `FetchTimeout` / `ObjectNotFound` / `Image` / `Storage` from the
    ///   collaborators; the queue is left untouched
    pub async fn generate(&self, filter: BatchFilter) -> BatchResult<GeneratedBatch> {
        let _guard = self
            .generation
            .try_lock()
            .map_err(|_| BatchError::AlreadyRunning)?;
        let started = Instant::now();

        let queue = self.queue.unbatched_items().await?;
        let sheet_config = self.config.sheet_config();
        debug!(queued = queue.len(), ?filter, "Planning batch");

        let plan = plan_batch(&queue, &filter, &sheet_config)?;
        info!(
            placed = plan.placements.len(),
            unplaced = plan.unplaced_labels.len(),
            used_length_in = plan.used_length_in,
            "Batch planned"
        );
        if !plan.skipped_labels.is_empty() {
            warn!(count = plan.skipped_labels.len(), "Skipped units without source image");
        }
        if !plan.oversized_labels.is_empty() {
            warn!(
                count = plan.oversized_labels.len(),
                labels = ?plan.oversized_labels,
                "Units wider than the printable width were left queued"
            );
        }

        let raster = RasterPlan::from_plan(&plan, sheet_config.sheet_width_in, self.config.render.dpi);
        let sources = self.fetch_sources(&raster).await?;
        let png = self.compositor.composite(&raster, &sources).await?;

        let created_at = Utc::now();
        let export_key = self.config.export_key(created_at.timestamp_millis());
        let size = png.len();
        self.objects.put(&export_key, png, "image/png").await?;

        let sheet = BatchSheet {
            id: Uuid::new_v4().to_string(),
            export_key,
            length_in: plan.used_length_in,
            status: BatchStatus::Generated,
            notes: None,
            placements: plan.sheet_placements(),
            created_at,
        };
        self.store.save_batch(&sheet, &plan.claims).await?;

        info!(
            batch_id = %sheet.id,
            export_key = %sheet.export_key,
            bytes = size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch generated"
        );

        Ok(GeneratedBatch {
            sheet,
            claims: plan.claims,
            unplaced_labels: plan.unplaced_labels,
            skipped_labels: plan.skipped_labels,
            oversized_labels: plan.oversized_labels,
        })
    }

    /// Downloads every distinct source, bounded and individually timed out.
    async fn fetch_sources(&self, raster: &RasterPlan) -> BatchResult<HashMap<String, Vec<u8>>> {
        let keys: Vec<String> = raster.source_keys().into_iter().map(str::to_string).collect();
        let timeout = self.config.fetch_timeout();
        let secs = self.config.fetch.timeout_secs;
        let objects = &self.objects;

        debug!(sources = keys.len(), concurrency = self.config.fetch.concurrency, "Fetching sources");

        let fetched: Vec<BatchResult<(String, Vec<u8>)>> = stream::iter(keys)
            .map(|key| async move {
                match tokio::time::timeout(timeout, objects.get(&key)).await {
                    Ok(Ok(bytes)) => Ok((key, bytes)),
                    Ok(Err(e)) => Err(e),
                    Err(_) => Err(BatchError::FetchTimeout { key, secs }),
                }
            })
            .buffer_unordered(self.config.fetch.concurrency)
            .collect()
            .await;

        fetched.into_iter().collect()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Loads one sheet.
    pub async fn get(&self, id: &str) -> BatchResult<BatchSheet> {
        self.store
            .load_batch(id)
            .await?
            .ok_or_else(|| BatchError::BatchNotFound(id.to_string()))
    }

    /// All sheets, newest first; archived ones only when asked for.
    pub async fn list(&self, include_archived: bool) -> BatchResult<Vec<BatchSheet>> {
        let batches = self.store.list_batches().await?;
        Ok(batches
            .into_iter()
            .filter(|b| include_archived || b.status != BatchStatus::Archived)
            .collect())
    }

    /// Moves a sheet through its production workflow.
    ///
    /// Setting the current status again is a no-op.
    pub async fn update_status(&self, id: &str, status: BatchStatus) -> BatchResult<BatchSheet> {
        let mut sheet = self.get(id).await?;
        if sheet.status == status {
            return Ok(sheet);
        }
        if !sheet.status.can_transition_to(status) {
            return Err(CoreError::InvalidStatusTransition {
                batch_id: id.to_string(),
                from: sheet.status,
                to: status,
            }
            .into());
        }

        self.store.set_status(id, status).await?;
        info!(batch_id = %id, from = %sheet.status, to = %status, "Batch status updated");
        sheet.status = status;
        Ok(sheet)
    }

    /// Replaces the operator notes; blank notes clear them.
    pub async fn update_notes(&self, id: &str, notes: Option<String>) -> BatchResult<BatchSheet> {
        let mut sheet = self.get(id).await?;
        let notes = notes.filter(|n| !n.trim().is_empty());

        self.store.set_notes(id, notes.clone()).await?;
        debug!(batch_id = %id, has_notes = notes.is_some(), "Batch notes updated");
        sheet.notes = notes;
        Ok(sheet)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
