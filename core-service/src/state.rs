//! Shared state injected into every handler.

use crate::session::SessionResolver;
use bridge_traits::time::Clock;
use core_auth::{CredentialStore, OAuthFlowManager};
use core_sync::SyncEngine;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SyncEngine>,
    pub oauth: Arc<OAuthFlowManager>,
    pub credentials: Arc<dyn CredentialStore>,
    pub sessions: Arc<dyn SessionResolver>,
    pub clock: Arc<dyn Clock>,
    /// Pool behind the catalog, used by the health check
    pub pool: SqlitePool,
}
