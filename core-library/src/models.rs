//! Domain models for the event gallery catalog
//!
//! Events map one-to-one to remote folders (or are created natively), photos
//! belong to exactly one event, and sync logs record each ingestion attempt.

use crate::error::{LibraryError, Result};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Where a photo came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
pub enum PhotoSource {
    GoogleDrive,
    Upload,
}

impl PhotoSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoSource::GoogleDrive => "google_drive",
            PhotoSource::Upload => "upload",
        }
    }
}

impl fmt::Display for PhotoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a sync attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum SyncLogStatus {
    Running,
    Success,
    Failed,
}

impl SyncLogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncLogStatus::Running => "running",
            SyncLogStatus::Success => "success",
            SyncLogStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SyncLogStatus::Running)
    }
}

impl fmt::Display for SyncLogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// A gallery of photos, optionally mirrored from a remote folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Event {
    /// Unique identifier (UUID string)
    pub id: String,
    /// URL slug, unique and never changed after creation
    pub slug: String,
    /// Display name; the title falls back to the creation date when unset
    pub display_name: Option<String>,
    /// Photo shown on the event card
    pub cover_photo_id: Option<String>,
    /// Remote folder this event mirrors (None for native events)
    pub google_drive_folder_id: Option<String>,
    /// Completion time of the last successful sync
    pub last_sync_at: Option<i64>,
    pub auto_sync_enabled: bool,
    pub created_at: i64,
}

impl Event {
    /// Create an event for a remote folder. Mirrored events have auto-sync
    /// enabled from the start.
    pub fn from_remote_folder(
        folder_id: impl Into<String>,
        display_name: Option<String>,
        slug: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            slug: slug.into(),
            display_name,
            cover_photo_id: None,
            google_drive_folder_id: Some(folder_id.into()),
            last_sync_at: None,
            auto_sync_enabled: true,
            created_at,
        }
    }

    /// Native event fixture, not mirrored from a remote folder.
    #[cfg(test)]
    pub(crate) fn native(
        display_name: Option<String>,
        slug: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            slug: slug.into(),
            display_name,
            cover_photo_id: None,
            google_drive_folder_id: None,
            last_sync_at: None,
            auto_sync_enabled: false,
            created_at,
        }
    }

    /// Human readable title: the display name, or the creation date
    /// formatted like `January 5, 2025`.
    pub fn title(&self) -> String {
        if let Some(name) = self.display_name.as_deref() {
            let name = name.trim();
            if !name.is_empty() {
                return name.to_string();
            }
        }

        DateTime::from_timestamp(self.created_at, 0)
            .map(|date| date.format("%B %-d, %Y").to_string())
            .unwrap_or_else(|| self.slug.clone())
    }

    /// Validate event data
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.slug.trim().is_empty() {
            return Err("Event slug cannot be empty".to_string());
        }

        if self
            .slug
            .chars()
            .any(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'))
        {
            return Err(format!("Event slug '{}' contains invalid characters", self.slug));
        }

        if let Some(folder_id) = &self.google_drive_folder_id {
            if folder_id.trim().is_empty() {
                return Err("Remote folder id cannot be empty".to_string());
            }
        }

        if self.created_at < 0 {
            return Err("Creation time cannot be negative".to_string());
        }

        Ok(())
    }
}

/// One image belonging to an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Photo {
    pub id: String,
    pub event_id: String,
    /// Public URL of the stored object
    pub image_url: String,
    /// Hidden until curated
    pub is_visible: bool,
    pub source: PhotoSource,
    /// Remote file this photo was ingested from (None for uploads)
    pub google_drive_file_id: Option<String>,
    pub taken_at: i64,
    pub created_at: i64,
}

impl Photo {
    /// Create a hidden photo ingested from a remote file.
    pub fn from_remote_file(
        event_id: impl Into<String>,
        remote_file_id: impl Into<String>,
        image_url: impl Into<String>,
        taken_at: i64,
        created_at: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id: event_id.into(),
            image_url: image_url.into(),
            is_visible: false,
            source: PhotoSource::GoogleDrive,
            google_drive_file_id: Some(remote_file_id.into()),
            taken_at,
            created_at,
        }
    }

    /// Validate photo data
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.event_id.trim().is_empty() {
            return Err("Photo must belong to an event".to_string());
        }

        if self.image_url.trim().is_empty() {
            return Err("Photo image URL cannot be empty".to_string());
        }

        match (self.source, &self.google_drive_file_id) {
            (PhotoSource::GoogleDrive, None) => {
                Err("Remote photos must carry their remote file id".to_string())
            }
            (PhotoSource::GoogleDrive, Some(id)) if id.trim().is_empty() => {
                Err("Remote file id cannot be empty".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Audit record of one ingestion attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SyncLog {
    pub id: String,
    /// Event being synced; unknown until the event is resolved
    pub event_id: Option<String>,
    pub status: SyncLogStatus,
    pub photos_added: i64,
    /// Set only when the attempt failed
    pub error_message: Option<String>,
    pub started_at: i64,
    pub completed_at: Option<i64>,
}

impl SyncLog {
    /// Open a new running attempt.
    pub fn start(event_id: Option<String>, started_at: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            status: SyncLogStatus::Running,
            photos_added: 0,
            error_message: None,
            started_at,
            completed_at: None,
        }
    }

    /// Transition `running -> success`.
    pub fn succeed(&mut self, photos_added: i64, completed_at: i64) -> Result<()> {
        self.transition(SyncLogStatus::Success)?;
        self.photos_added = photos_added;
        self.completed_at = Some(completed_at);
        Ok(())
    }

    /// Transition `running -> failed`.
    pub fn fail(&mut self, message: impl Into<String>, completed_at: i64) -> Result<()> {
        self.transition(SyncLogStatus::Failed)?;
        self.error_message = Some(message.into());
        self.completed_at = Some(completed_at);
        Ok(())
    }

    fn transition(&mut self, to: SyncLogStatus) -> Result<()> {
        if self.status.is_terminal() {
            return Err(LibraryError::InvalidStateTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_title_prefers_display_name() {
        let event =
            Event::from_remote_folder("folder", Some("Miami Launch".into()), "miami-launch-x", 0);
        assert_eq!(event.title(), "Miami Launch");
        assert!(event.auto_sync_enabled);
        assert_eq!(event.google_drive_folder_id.as_deref(), Some("folder"));
    }

    #[test]
    fn test_event_title_falls_back_to_date() {
        // 2025-01-05T12:00:00Z
        let event = Event::native(Some("   ".into()), "event-1", 1_736_078_400);
        assert_eq!(event.title(), "January 5, 2025");
        assert!(!event.auto_sync_enabled);
    }

    #[test]
    fn test_event_validation() {
        let mut event = Event::native(None, "good-slug-1", 0);
        assert!(event.validate().is_ok());

        event.slug = "Bad Slug".to_string();
        assert!(event.validate().is_err());

        event.slug = "ok".to_string();
        event.google_drive_folder_id = Some(" ".to_string());
        assert!(event.validate().is_err());
    }

    #[test]
    fn test_remote_photo_is_hidden() {
        let photo = Photo::from_remote_file("event", "file", "https://cdn/x.jpg", 10, 20);
        assert!(!photo.is_visible);
        assert_eq!(photo.source, PhotoSource::GoogleDrive);
        assert!(photo.validate().is_ok());
    }

    #[test]
    fn test_remote_photo_requires_file_id() {
        let mut photo = Photo::from_remote_file("event", "file", "https://cdn/x.jpg", 10, 20);
        photo.google_drive_file_id = None;
        assert!(photo.validate().is_err());

        photo.source = PhotoSource::Upload;
        assert!(photo.validate().is_ok());
    }

    #[test]
    fn test_sync_log_transitions() {
        let mut log = SyncLog::start(None, 100);
        assert_eq!(log.status, SyncLogStatus::Running);

        log.succeed(3, 110).unwrap();
        assert_eq!(log.status, SyncLogStatus::Success);
        assert_eq!(log.photos_added, 3);
        assert_eq!(log.completed_at, Some(110));

        assert!(log.fail("late", 120).is_err());
        assert!(log.succeed(4, 120).is_err());
        assert_eq!(log.photos_added, 3);
    }

    #[test]
    fn test_sync_log_failure_keeps_message() {
        let mut log = SyncLog::start(Some("event".into()), 100);
        log.fail("listing failed", 105).unwrap();
        assert_eq!(log.status, SyncLogStatus::Failed);
        assert_eq!(log.error_message.as_deref(), Some("listing failed"));
    }
}
