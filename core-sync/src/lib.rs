//! # Sync Module
//!
//! Mirrors remote folders into the event gallery.
//!
//! ## Overview
//!
//! This module drives ingestion from the remote storage tree:
//! - Resolving the access token once per invocation
//! - Listing remote folders and filtering still images
//! - Skipping images already ingested into an event
//! - Copying new images into object storage and recording them
//! - Auditing every attempt in the sync log
//!
//! ## Components
//!
//! - **Ingestion Pipeline** (`pipeline`): Syncs one folder into one event
//! - **Fleet Orchestrator** (`fleet`): Syncs all child folders of a parent
//! - **Sync Engine** (`engine`): Credential resolution and connector binding
//! - **Catalog** (`catalog`): Repository handles and event resolution

pub mod catalog;
pub mod engine;
pub mod error;
pub mod fleet;
pub mod pipeline;

pub use catalog::Catalog;
pub use engine::{SyncAuth, SyncEngine};
pub use error::{Result, SyncError};
pub use fleet::{FleetOrchestrator, FleetReport, PerChildResult};
pub use pipeline::{
    object_key, FolderSyncReport, FolderSyncRequest, IngestionPipeline, ItemOutcome, SkipReason,
};
