//! # gangsheet-batch: Batch Generation for the Gang Sheet Shop
//!
//! This crate takes the unbatched order queue, packs it onto a sheet with
//! `gangsheet-core`, renders the sheet and records it for production.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Batch Layer Architecture                          │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 BatchService (Main Orchestrator)                 │  │
//! │  │                                                                  │  │
//! │  │  Single-flight generate, status + notes lifecycle                │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │      ┌────────────────┬───────┴────────┬────────────────┐              │
//! │      ▼                ▼                ▼                ▼               │
//! │  ┌──────────┐   ┌───────────┐   ┌────────────┐   ┌────────────┐        │
//! │  │QueueSrc  │   │ObjectStore│   │ Compositor │   │ BatchStore │        │
//! │  │          │   │           │   │            │   │            │        │
//! │  │MemoryStore   │LocalObject│   │PngComposit.│   │MemoryStore │        │
//! │  └──────────┘   └───────────┘   └────────────┘   └────────────┘        │
//! │                                                                         │
//! │  BatchConfig: defaults → batch.toml → GANGSHEET_* env → validate       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`service`] - `BatchService` orchestrator
//! - [`collaborators`] - Async traits at the storage / imaging seams
//! - [`storage`] - Local filesystem object store, in-memory queue + store
//! - [`compositor`] - PNG rendering with the `image` crate
//! - [`config`] - Batch configuration (sheet, render, fetch, export)
//! - [`error`] - Batch error types
//! - [`payload`] - JSON arguments and output for the CLI
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gangsheet_batch::{BatchConfig, BatchService, LocalObjectStore, MemoryStore, PngCompositor};
//! use gangsheet_core::assembly::BatchFilter;
//!
//! let config = BatchConfig::load_or_default(None);
//! let store = Arc::new(MemoryStore::new(queue));
//! let service = BatchService::new(
//!     config,
//!     store.clone(),
//!     Arc::new(LocalObjectStore::new("./objects")),
//!     Arc::new(PngCompositor),
//!     store,
//! );
//!
//! let batch = service.generate(BatchFilter::All).await?;
//! println!("Sheet {} at {}", batch.sheet.id, batch.sheet.export_key);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod collaborators;
pub mod compositor;
pub mod config;
pub mod error;
pub mod payload;
pub mod service;
pub mod storage;

// =============================================================================
// Re-exports
// =============================================================================

pub use collaborators::{BatchStore, Compositor, ObjectStore, QueueSource};
pub use compositor::PngCompositor;
pub use config::BatchConfig;
pub use error::{BatchError, BatchResult};
pub use service::{BatchService, GeneratedBatch};
pub use storage::{LocalObjectStore, MemoryStore};
