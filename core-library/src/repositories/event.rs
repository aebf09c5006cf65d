//! Event repository trait and implementation

use crate::error::{LibraryError, Result};
use crate::models::Event;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

/// Event repository interface for data access operations
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Find an event by its ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>>;

    /// Find the event mirroring a remote folder
    async fn find_by_remote_folder_id(&self, folder_id: &str) -> Result<Option<Event>>;

    /// Insert a new event
    ///
    /// # Errors
    /// Returns error if:
    /// - The slug or remote folder id is already taken (`Duplicate`)
    /// - Event validation fails
    /// - Database error occurs
    async fn insert(&self, event: &Event) -> Result<()>;

    /// Record the completion time of a successful sync
    ///
    /// # Errors
    /// Returns `NotFound` if the event does not exist.
    async fn update_last_sync(&self, id: &str, last_sync_at: i64) -> Result<()>;
}

/// SQLite implementation of EventRepository
pub struct SqliteEventRepository {
    pool: SqlitePool,
}

impl SqliteEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn validate_event(event: &Event) -> Result<()> {
        event.validate().map_err(|msg| LibraryError::InvalidInput {
            field: "Event".to_string(),
            message: msg,
        })
    }
}

const EVENT_COLUMNS: &str = "id, slug, display_name, cover_photo_id, google_drive_folder_id, \
     last_sync_at, auto_sync_enabled, created_at";

#[async_trait]
impl EventRepository for SqliteEventRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?");
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn find_by_remote_folder_id(&self, folder_id: &str) -> Result<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE google_drive_folder_id = ?");
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(folder_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn insert(&self, event: &Event) -> Result<()> {
        Self::validate_event(event)?;

        sqlx::query(
            r#"
            INSERT INTO events (
                id, slug, display_name, cover_photo_id, google_drive_folder_id,
                last_sync_at, auto_sync_enabled, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.id)
        .bind(&event.slug)
        .bind(&event.display_name)
        .bind(&event.cover_photo_id)
        .bind(&event.google_drive_folder_id)
        .bind(event.last_sync_at)
        .bind(event.auto_sync_enabled)
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let key = event
                .google_drive_folder_id
                .as_deref()
                .unwrap_or(event.slug.as_str());
            LibraryError::from_insert(e, "Event", key)
        })?;

        debug!(event_id = %event.id, slug = %event.slug, "Inserted event");
        Ok(())
    }

    async fn update_last_sync(&self, id: &str, last_sync_at: i64) -> Result<()> {
        let result = sqlx::query("UPDATE events SET last_sync_at = ? WHERE id = ?")
            .bind(last_sync_at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(LibraryError::NotFound {
                entity_type: "Event".to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }
}
