//! # Fleet Orchestrator
//!
//! Syncs every child folder of a parent folder, one event per child.
//! A failing child is recorded in the report and never stops the others.

use crate::error::{Result, SyncError};
use crate::pipeline::{FolderSyncRequest, IngestionPipeline};
use bridge_traits::storage::{RemoteEntry, RemoteTreeClient};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Outcome of syncing one child folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerChildResult {
    pub folder_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photos_added: Option<u64>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PerChildResult {
    fn succeeded(folder_name: String, event_id: String, photos_added: u64) -> Self {
        Self {
            folder_name,
            event_id: Some(event_id),
            photos_added: Some(photos_added),
            success: true,
            error: None,
        }
    }

    fn failed(folder_name: String, event_id: Option<String>, error: &SyncError) -> Self {
        Self {
            folder_name,
            event_id,
            photos_added: None,
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// Summary of a fleet sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetReport {
    pub total_folders: usize,
    pub results: Vec<PerChildResult>,
}

impl FleetReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn photos_added(&self) -> u64 {
        self.results.iter().filter_map(|r| r.photos_added).sum()
    }
}

pub struct FleetOrchestrator {
    pipeline: Arc<IngestionPipeline>,
}

impl FleetOrchestrator {
    pub fn new(pipeline: Arc<IngestionPipeline>) -> Self {
        Self { pipeline }
    }

    /// Sync every child folder of `parent_folder_id`, sequentially.
    ///
    /// # Errors
    ///
    /// Only a failure to list the parent is returned ([`SyncError::Remote`]);
    /// per-child failures are reported in [`FleetReport::results`].
    #[instrument(skip(self, remote))]
    pub async fn sync_all(
        &self,
        remote: &dyn RemoteTreeClient,
        parent_folder_id: &str,
    ) -> Result<FleetReport> {
        let parent_folder_id = parent_folder_id.trim();
        if parent_folder_id.is_empty() {
            return Err(SyncError::Validation(
                "parent folder id is required".to_string(),
            ));
        }

        let folders = remote.list_children(parent_folder_id, true).await?;
        info!(total_folders = folders.len(), "Syncing child folders");

        let mut results = Vec::with_capacity(folders.len());
        for folder in &folders {
            results.push(self.sync_child(remote, folder).await);
        }

        let report = FleetReport {
            total_folders: folders.len(),
            results,
        };

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            photos_added = report.photos_added(),
            "Fleet sync completed"
        );

        Ok(report)
    }

    async fn sync_child(&self, remote: &dyn RemoteTreeClient, folder: &RemoteEntry) -> PerChildResult {
        let now = self.pipeline.clock().unix_timestamp();
        let event = match self
            .pipeline
            .catalog()
            .resolve_or_create_event(&folder.id, &folder.name, now)
            .await
        {
            Ok(event) => event,
            Err(err) => {
                let err = SyncError::from(err);
                warn!(folder_id = %folder.id, error = %err, "Failed to resolve event for folder");
                return PerChildResult::failed(folder.name.clone(), None, &err);
            }
        };

        let request = FolderSyncRequest::new(folder.id.clone()).with_event_id(event.id.clone());
        match self.pipeline.sync_folder(remote, request).await {
            Ok(report) => {
                PerChildResult::succeeded(folder.name.clone(), event.id, report.photos_added)
            }
            Err(err) => {
                warn!(folder_id = %folder.id, error = %err, "Child folder sync failed");
                PerChildResult::failed(folder.name.clone(), Some(event.id), &err)
            }
        }
    }
}
