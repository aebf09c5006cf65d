//! # Sync Engine
//!
//! Entry point for the HTTP layer. Resolves the access token once per
//! invocation, binds one connector to it, and runs either a single folder
//! sync or a fleet sync with that connector.

use crate::error::{Result, SyncError};
use crate::fleet::{FleetOrchestrator, FleetReport};
use crate::pipeline::{FolderSyncReport, FolderSyncRequest, IngestionPipeline};
use bridge_traits::storage::{RemoteTreeClient, RemoteTreeClientFactory};
use core_auth::{CredentialRefresher, PrincipalId};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

/// How the remote access token for an invocation is obtained.
#[derive(Clone)]
pub enum SyncAuth {
    /// Caller-supplied token, used as-is
    AccessToken(String),
    /// Stored credential of a principal, refreshed when expired
    Principal(PrincipalId),
}

impl fmt::Debug for SyncAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAuth::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
            SyncAuth::Principal(principal) => write!(f, "Principal({})", principal),
        }
    }
}

pub struct SyncEngine {
    refresher: Arc<CredentialRefresher>,
    connectors: Arc<dyn RemoteTreeClientFactory>,
    pipeline: Arc<IngestionPipeline>,
    fleet: FleetOrchestrator,
}

impl SyncEngine {
    pub fn new(
        refresher: Arc<CredentialRefresher>,
        connectors: Arc<dyn RemoteTreeClientFactory>,
        pipeline: Arc<IngestionPipeline>,
    ) -> Self {
        let fleet = FleetOrchestrator::new(pipeline.clone());
        Self {
            refresher,
            connectors,
            pipeline,
            fleet,
        }
    }

    pub fn pipeline(&self) -> &Arc<IngestionPipeline> {
        &self.pipeline
    }

    /// Sync one remote folder.
    #[instrument(skip(self, request), fields(folder_id = %request.remote_folder_id))]
    pub async fn sync_folder(
        &self,
        auth: SyncAuth,
        request: FolderSyncRequest,
    ) -> Result<FolderSyncReport> {
        request.validate()?;
        let remote = self.connect(&auth).await?;
        self.pipeline.sync_folder(remote.as_ref(), request).await
    }

    /// Sync every child folder of `parent_folder_id` with the principal's
    /// stored credential. An unusable credential aborts before any folder is
    /// touched.
    #[instrument(skip(self))]
    pub async fn sync_all(
        &self,
        principal: &PrincipalId,
        parent_folder_id: &str,
    ) -> Result<FleetReport> {
        if parent_folder_id.trim().is_empty() {
            return Err(SyncError::Validation(
                "parent folder id is required".to_string(),
            ));
        }

        let remote = self.connect(&SyncAuth::Principal(principal.clone())).await?;
        self.fleet.sync_all(remote.as_ref(), parent_folder_id).await
    }

    async fn connect(&self, auth: &SyncAuth) -> Result<Arc<dyn RemoteTreeClient>> {
        let token = match auth {
            SyncAuth::AccessToken(token) => {
                if token.trim().is_empty() {
                    return Err(SyncError::Validation("access token is empty".to_string()));
                }
                token.clone()
            }
            SyncAuth::Principal(principal) => {
                let token = self.refresher.resolve_access_token(principal).await?;
                token.as_str().to_string()
            }
        };

        debug!("Bound remote connector");
        Ok(self.connectors.connect(&token))
    }
}
