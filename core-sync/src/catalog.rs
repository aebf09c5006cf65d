//! Catalog handles shared by the pipeline and the fleet orchestrator.

use core_library::{
    derive_slug, Event, EventRepository, PhotoRepository, Result, SqliteEventRepository,
    SqlitePhotoRepository, SqliteSyncLogRepository, SyncLogRepository,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info};

/// The three catalog repositories the sync engine reads and writes.
#[derive(Clone)]
pub struct Catalog {
    pub events: Arc<dyn EventRepository>,
    pub photos: Arc<dyn PhotoRepository>,
    pub sync_logs: Arc<dyn SyncLogRepository>,
}

impl Catalog {
    pub fn new(
        events: Arc<dyn EventRepository>,
        photos: Arc<dyn PhotoRepository>,
        sync_logs: Arc<dyn SyncLogRepository>,
    ) -> Self {
        Self {
            events,
            photos,
            sync_logs,
        }
    }

    /// SQLite-backed catalog over one pool.
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self::new(
            Arc::new(SqliteEventRepository::new(pool.clone())),
            Arc::new(SqlitePhotoRepository::new(pool.clone())),
            Arc::new(SqliteSyncLogRepository::new(pool)),
        )
    }

    /// Return the event mirroring `folder_id`, creating it when missing.
    ///
    /// A concurrent creation of the same event surfaces as a duplicate
    /// insert; the winner's row is read back and returned instead.
    pub async fn resolve_or_create_event(
        &self,
        folder_id: &str,
        display_name: &str,
        now: i64,
    ) -> Result<Event> {
        if let Some(event) = self.events.find_by_remote_folder_id(folder_id).await? {
            debug!(event_id = %event.id, folder_id, "Reusing event for folder");
            return Ok(event);
        }

        let name = display_name.trim();
        let event = Event::from_remote_folder(
            folder_id,
            (!name.is_empty()).then(|| name.to_string()),
            derive_slug(name),
            now,
        );

        match self.events.insert(&event).await {
            Ok(()) => {
                info!(
                    event_id = %event.id,
                    slug = %event.slug,
                    title = %event.title(),
                    folder_id,
                    "Created event for folder"
                );
                Ok(event)
            }
            Err(err) if err.is_duplicate() => {
                debug!(folder_id, "Event created concurrently, re-reading");
                match self.events.find_by_remote_folder_id(folder_id).await? {
                    Some(existing) => Ok(existing),
                    None => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }
}
