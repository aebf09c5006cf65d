//! # Ingestion Pipeline
//!
//! Copies new images from one remote folder into object storage and records
//! them in the catalog.
//!
//! ## Workflow
//!
//! 1. Validate the request (nothing is written for an invalid request)
//! 2. Open a `running` sync log
//! 3. Resolve the event: the supplied one, the one already mirroring the
//!    folder, or a new event named after the remote folder
//! 4. List the folder and keep still images
//! 5. Load the remote file ids already ingested into the event
//! 6. For each new image: download, store, insert the photo
//! 7. Complete the sync log and stamp `last_sync_at` on the event
//!
//! A failure in steps 3-5 marks the sync log `failed` and is returned to the
//! caller. A failure in step 6 only skips that image.

use crate::catalog::Catalog;
use crate::error::{Result, SyncError};
use bridge_traits::storage::{ObjectStore, RemoteEntry, RemoteTreeClient};
use bridge_traits::time::Clock;
use core_library::{Photo, SyncLog};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ============================================================================
// Request / Report Types
// ============================================================================

/// Input of one folder sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSyncRequest {
    pub remote_folder_id: String,
    /// Event to sync into; resolved from the folder when `None`
    pub event_id: Option<String>,
}

impl FolderSyncRequest {
    pub fn new(remote_folder_id: impl Into<String>) -> Self {
        Self {
            remote_folder_id: remote_folder_id.into(),
            event_id: None,
        }
    }

    pub fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.remote_folder_id.trim().is_empty() {
            return Err(SyncError::Validation(
                "remote folder id is required".to_string(),
            ));
        }
        if matches!(self.event_id.as_deref(), Some(id) if id.trim().is_empty()) {
            return Err(SyncError::Validation("event id cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Why a candidate image was not added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyIngested,
    DownloadFailed,
    StorageFailed,
    CatalogFailed,
}

/// Result of processing one candidate image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ItemOutcome {
    #[serde(rename_all = "camelCase")]
    Added {
        remote_file_id: String,
        photo_id: String,
    },
    #[serde(rename_all = "camelCase")]
    Skipped {
        remote_file_id: String,
        reason: SkipReason,
    },
}

impl ItemOutcome {
    pub fn remote_file_id(&self) -> &str {
        match self {
            ItemOutcome::Added { remote_file_id, .. }
            | ItemOutcome::Skipped { remote_file_id, .. } => remote_file_id,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            ItemOutcome::Skipped { reason, .. } => Some(*reason),
            ItemOutcome::Added { .. } => None,
        }
    }
}

/// Summary of one folder sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderSyncReport {
    pub event_id: String,
    pub sync_log_id: String,
    pub photos_added: u64,
    /// Still images found in the folder, ingested before or not
    pub total_files: u64,
    pub outcomes: Vec<ItemOutcome>,
}

impl FolderSyncReport {
    pub fn skipped(&self, reason: SkipReason) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.skip_reason() == Some(reason))
            .count()
    }
}

/// Per-item failure carrying the reason reported in the outcome.
struct ItemFailure {
    reason: SkipReason,
    error: SyncError,
}

impl ItemFailure {
    fn new(reason: SkipReason, error: impl Into<SyncError>) -> Self {
        Self {
            reason,
            error: error.into(),
        }
    }
}

/// Event and candidate set resolved before any image is touched.
struct PreparedSync {
    event_id: String,
    candidates: Vec<RemoteEntry>,
    existing: HashSet<String>,
}

// ============================================================================
// Pipeline
// ============================================================================

pub struct IngestionPipeline {
    catalog: Catalog,
    object_store: Arc<dyn ObjectStore>,
    clock: Arc<dyn Clock>,
    bucket: String,
}

impl IngestionPipeline {
    pub fn new(
        catalog: Catalog,
        object_store: Arc<dyn ObjectStore>,
        clock: Arc<dyn Clock>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            object_store,
            clock,
            bucket: bucket.into(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Sync one remote folder into its event.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Validation`] for an empty folder id or an unknown
    ///   `event_id`; no sync log is written
    /// - [`SyncError::Remote`] or [`SyncError::Catalog`] when the event cannot
    ///   be resolved or the folder cannot be listed; the sync log is marked
    ///   `failed`
    ///
    /// Once items have been processed the report is always returned. A
    /// failure to complete the sync log or stamp `last_sync_at` is logged.
    #[instrument(skip(self, remote, request), fields(folder_id = %request.remote_folder_id))]
    pub async fn sync_folder(
        &self,
        remote: &dyn RemoteTreeClient,
        request: FolderSyncRequest,
    ) -> Result<FolderSyncReport> {
        request.validate()?;
        let folder_id = request.remote_folder_id.trim();

        if let Some(event_id) = request.event_id.as_deref() {
            if self.catalog.events.find_by_id(event_id).await?.is_none() {
                return Err(SyncError::Validation(format!(
                    "event {} does not exist",
                    event_id
                )));
            }
        }

        let mut log = SyncLog::start(request.event_id.clone(), self.clock.unix_timestamp());
        self.catalog.sync_logs.insert(&log).await?;
        debug!(sync_log_id = %log.id, "Opened sync log");

        let prepared = match self
            .prepare(remote, folder_id, request.event_id.as_deref(), &log.id)
            .await
        {
            Ok(prepared) => prepared,
            Err(err) => {
                self.mark_failed(&mut log, &err).await;
                return Err(err);
            }
        };

        let PreparedSync {
            event_id,
            candidates,
            mut existing,
        } = prepared;

        info!(
            event_id = %event_id,
            candidates = candidates.len(),
            already_ingested = existing.len(),
            "Ingesting images"
        );

        let mut outcomes = Vec::with_capacity(candidates.len());
        let mut photos_added = 0u64;

        for entry in &candidates {
            if existing.contains(&entry.id) {
                outcomes.push(ItemOutcome::Skipped {
                    remote_file_id: entry.id.clone(),
                    reason: SkipReason::AlreadyIngested,
                });
                continue;
            }

            match self.ingest_item(remote, &event_id, entry).await {
                Ok(photo_id) => {
                    photos_added += 1;
                    existing.insert(entry.id.clone());
                    debug!(file_id = %entry.id, photo_id = %photo_id, "Added photo");
                    outcomes.push(ItemOutcome::Added {
                        remote_file_id: entry.id.clone(),
                        photo_id,
                    });
                }
                Err(failure) => {
                    if failure.reason == SkipReason::AlreadyIngested {
                        debug!(file_id = %entry.id, "Photo ingested concurrently");
                    } else {
                        warn!(
                            file_id = %entry.id,
                            file_name = %entry.name,
                            reason = ?failure.reason,
                            error = %failure.error,
                            "Skipping image"
                        );
                    }
                    outcomes.push(ItemOutcome::Skipped {
                        remote_file_id: entry.id.clone(),
                        reason: failure.reason,
                    });
                }
            }
        }

        let completed_at = self.clock.unix_timestamp();
        log.succeed(photos_added as i64, completed_at)?;

        // Photos are already committed past this point.
        if let Err(err) = self.catalog.sync_logs.complete(&log).await {
            warn!(sync_log_id = %log.id, error = %err, "Failed to complete sync log");
        }
        if let Err(err) = self
            .catalog
            .events
            .update_last_sync(&event_id, completed_at)
            .await
        {
            warn!(event_id = %event_id, error = %err, "Failed to record last sync time");
        }

        info!(
            event_id = %event_id,
            photos_added,
            total_files = candidates.len(),
            "Folder sync completed"
        );

        Ok(FolderSyncReport {
            event_id,
            sync_log_id: log.id,
            photos_added,
            total_files: candidates.len() as u64,
            outcomes,
        })
    }

    async fn prepare(
        &self,
        remote: &dyn RemoteTreeClient,
        folder_id: &str,
        event_id: Option<&str>,
        sync_log_id: &str,
    ) -> Result<PreparedSync> {
        let event_id = match event_id {
            Some(event_id) => event_id.to_string(),
            None => {
                let event_id = self.resolve_event(remote, folder_id).await?;
                self.catalog
                    .sync_logs
                    .link_event(sync_log_id, &event_id)
                    .await?;
                event_id
            }
        };

        let entries = remote.list_children(folder_id, false).await?;
        let listed = entries.len();
        let candidates: Vec<RemoteEntry> = entries
            .into_iter()
            .filter(RemoteEntry::is_still_image)
            .collect();
        debug!(listed, images = candidates.len(), "Listed folder");

        let existing = self
            .catalog
            .photos
            .existing_remote_file_ids(&event_id)
            .await?;

        Ok(PreparedSync {
            event_id,
            candidates,
            existing,
        })
    }

    async fn resolve_event(&self, remote: &dyn RemoteTreeClient, folder_id: &str) -> Result<String> {
        if let Some(event) = self.catalog.events.find_by_remote_folder_id(folder_id).await? {
            return Ok(event.id);
        }

        let folder = remote.get_metadata(folder_id).await?;
        let event = self
            .catalog
            .resolve_or_create_event(folder_id, &folder.name, self.clock.unix_timestamp())
            .await?;
        Ok(event.id)
    }

    async fn ingest_item(
        &self,
        remote: &dyn RemoteTreeClient,
        event_id: &str,
        entry: &RemoteEntry,
    ) -> std::result::Result<String, ItemFailure> {
        let data = remote
            .fetch_bytes(&entry.id)
            .await
            .map_err(|e| ItemFailure::new(SkipReason::DownloadFailed, e))?;

        let key = object_key(event_id, &entry.name);
        self.object_store
            .put_object(&self.bucket, &key, data, &entry.mime_type)
            .await
            .map_err(|e| {
                ItemFailure::new(SkipReason::StorageFailed, SyncError::Storage(e.to_string()))
            })?;
        let image_url = self.object_store.public_url(&self.bucket, &key);

        let now = self.clock.unix_timestamp();
        let taken_at = entry.created_time.map(|t| t.timestamp()).unwrap_or(now);
        let photo = Photo::from_remote_file(event_id, &entry.id, image_url, taken_at, now);

        match self.catalog.photos.insert(&photo).await {
            Ok(()) => Ok(photo.id),
            Err(err) if err.is_duplicate() => {
                Err(ItemFailure::new(SkipReason::AlreadyIngested, err))
            }
            Err(err) => Err(ItemFailure::new(SkipReason::CatalogFailed, err)),
        }
    }

    async fn mark_failed(&self, log: &mut SyncLog, err: &SyncError) {
        warn!(sync_log_id = %log.id, error = %err, "Folder sync failed");

        if let Err(e) = log.fail(err.to_string(), self.clock.unix_timestamp()) {
            warn!(error = %e, "Sync log already completed");
            return;
        }
        if let Err(e) = self.catalog.sync_logs.complete(log).await {
            warn!(sync_log_id = %log.id, error = %e, "Failed to mark sync log failed");
        }
    }
}

/// Object key for an ingested image: `<event_id>/<uuid>-<file name>`.
pub fn object_key(event_id: &str, file_name: &str) -> String {
    format!("{}/{}-{}", event_id, Uuid::new_v4(), sanitize_file_name(file_name))
}

/// Replace anything outside `[A-Za-z0-9._-]` so the name is a single safe
/// path segment.
fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let sanitized = sanitized.trim_start_matches('.');
    if sanitized.is_empty() {
        "image".to_string()
    } else {
        sanitized.to_string()
    }
}
