//! Photo repository trait and implementation

use crate::error::{LibraryError, Result};
use crate::models::Photo;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::debug;

#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// Insert a new photo
    ///
    /// # Errors
    /// Returns `Duplicate` when the event already holds a photo for the same
    /// remote file.
    async fn insert(&self, photo: &Photo) -> Result<()>;

    /// Remote file ids already ingested into an event (the de-dup key set)
    async fn existing_remote_file_ids(&self, event_id: &str) -> Result<HashSet<String>>;

    /// All photos of an event, oldest capture first
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Photo>>;
}

pub struct SqlitePhotoRepository {
    pool: SqlitePool,
}

impl SqlitePhotoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PhotoRepository for SqlitePhotoRepository {
    async fn insert(&self, photo: &Photo) -> Result<()> {
        photo.validate().map_err(|msg| LibraryError::InvalidInput {
            field: "Photo".to_string(),
            message: msg,
        })?;

        sqlx::query(
            r#"
            INSERT INTO photos (
                id, event_id, image_url, is_visible, source,
                google_drive_file_id, taken_at, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&photo.id)
        .bind(&photo.event_id)
        .bind(&photo.image_url)
        .bind(photo.is_visible)
        .bind(photo.source)
        .bind(&photo.google_drive_file_id)
        .bind(photo.taken_at)
        .bind(photo.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let key = format!(
                "{}/{}",
                photo.event_id,
                photo.google_drive_file_id.as_deref().unwrap_or(&photo.id)
            );
            LibraryError::from_insert(e, "Photo", &key)
        })?;

        debug!(photo_id = %photo.id, event_id = %photo.event_id, "Inserted photo");
        Ok(())
    }

    async fn existing_remote_file_ids(&self, event_id: &str) -> Result<HashSet<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT google_drive_file_id FROM photos
            WHERE event_id = ? AND google_drive_file_id IS NOT NULL
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Photo>> {
        let photos = sqlx::query_as::<_, Photo>(
            r#"
            SELECT id, event_id, image_url, is_visible, source,
                   google_drive_file_id, taken_at, created_at
            FROM photos
            WHERE event_id = ?
            ORDER BY taken_at ASC, created_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }
}
