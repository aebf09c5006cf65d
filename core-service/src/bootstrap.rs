//! Wiring of concrete adapters into an [`AppState`].

use crate::error::Result;
use crate::session::HeaderSessionResolver;
use crate::state::AppState;
use bridge_desktop::{LocalObjectStore, ReqwestHttpClient, RestObjectStore};
use bridge_traits::{Clock, HttpClient, ObjectStore, SystemClock};
use core_auth::{
    CredentialRefresher, CredentialStore, OAuthConfig, OAuthFlowManager, SqliteCredentialStore,
};
use core_library::{create_pool, DatabaseConfig};
use core_runtime::{EngineConfig, ObjectStoreConfig};
use core_sync::{Catalog, IngestionPipeline, SyncEngine};
use provider_google_drive::GoogleDriveConnectorFactory;
use std::sync::Arc;
use tracing::info;

/// Open the catalog, build the adapters and assemble the sync engine.
///
/// # Errors
///
/// Fails on an invalid configuration, an unreachable database or a failed
/// migration, and when the HTTP client cannot be constructed.
pub async fn bootstrap(config: &EngineConfig) -> Result<AppState> {
    config.validate()?;

    let pool = create_pool(DatabaseConfig::new(config.database_path.clone())).await?;
    let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new()?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let object_store = object_store(&config.object_store, http_client.clone());

    let oauth = Arc::new(OAuthFlowManager::new(
        OAuthConfig::google(
            &config.google_client_id,
            &config.google_client_secret,
            config.oauth_redirect_uri(),
        ),
        http_client.clone(),
    ));
    let credentials: Arc<dyn CredentialStore> = Arc::new(SqliteCredentialStore::new(pool.clone()));
    let refresher = Arc::new(CredentialRefresher::new(
        credentials.clone(),
        oauth.clone(),
        clock.clone(),
    ));

    let pipeline = Arc::new(IngestionPipeline::new(
        Catalog::sqlite(pool.clone()),
        object_store,
        clock.clone(),
        config.photo_bucket.clone(),
    ));
    let connectors = Arc::new(GoogleDriveConnectorFactory::new(http_client));
    let engine = Arc::new(SyncEngine::new(refresher, connectors, pipeline));

    info!(
        database = %config.database_path.display(),
        bucket = %config.photo_bucket,
        "Sync engine ready"
    );

    Ok(AppState {
        engine,
        oauth,
        credentials,
        sessions: Arc::new(HeaderSessionResolver::new()),
        clock,
        pool,
    })
}

fn object_store(config: &ObjectStoreConfig, http_client: Arc<dyn HttpClient>) -> Arc<dyn ObjectStore> {
    match config {
        ObjectStoreConfig::Rest { url, service_key } => {
            Arc::new(RestObjectStore::new(http_client, url, service_key))
        }
        ObjectStoreConfig::Local { root, public_url } => {
            Arc::new(LocalObjectStore::new(root.clone(), public_url))
        }
    }
}
