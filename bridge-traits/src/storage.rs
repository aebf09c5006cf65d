//! Remote Tree and Object Storage Abstractions
//!
//! Provides the contract the sync engine expects from a remote file-storage
//! tree (list children, fetch metadata, fetch bytes) and from the internal
//! object storage that ingested images are copied into.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::error::Result;

/// MIME type the remote tree uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// One child of a remote container, decoded into a fixed schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    /// Creation time reported by the remote service, if any
    pub created_time: Option<DateTime<Utc>>,
}

impl RemoteEntry {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    /// Still images only: anything whose type mentions video is excluded even
    /// when it also carries an `image/` prefix.
    pub fn is_still_image(&self) -> bool {
        self.mime_type.starts_with("image/") && !self.mime_type.contains("video")
    }
}

/// Metadata of a single remote container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFolder {
    pub id: String,
    pub name: String,
    pub created_time: Option<DateTime<Utc>>,
}

/// Read-only client over a remote storage tree, bound to one access token.
///
/// Implementations perform no retries; a non-2xx answer is reported as
/// [`BridgeError::Upstream`](crate::error::BridgeError::Upstream).
#[async_trait]
pub trait RemoteTreeClient: Send + Sync {
    /// List the children of a container (single page, capped by the
    /// implementation's page size).
    async fn list_children(&self, container_id: &str, folders_only: bool)
        -> Result<Vec<RemoteEntry>>;

    /// Fetch name and creation time of one container.
    async fn get_metadata(&self, container_id: &str) -> Result<RemoteFolder>;

    /// Download the raw bytes of one item.
    async fn fetch_bytes(&self, item_id: &str) -> Result<Bytes>;
}

/// Produces a [`RemoteTreeClient`] bound to a resolved access token.
pub trait RemoteTreeClientFactory: Send + Sync {
    fn connect(&self, access_token: &str) -> Arc<dyn RemoteTreeClient>;
}

/// Internal object storage for ingested images.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::ObjectStore;
///
/// async fn store(store: &dyn ObjectStore, data: Bytes) -> Result<String> {
///     store.put_object("event-photos", "event-1/abc.jpg", data, "image/jpeg").await?;
///     Ok(store.public_url("event-photos", "event-1/abc.jpg"))
/// }
/// ```
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write an object. Existing objects at the same key are never
    /// overwritten; that case is reported as an error.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<()>;

    /// Public URL under which a stored object is served.
    fn public_url(&self, bucket: &str, key: &str) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(mime_type: &str) -> RemoteEntry {
        RemoteEntry {
            id: "file".to_string(),
            name: "name".to_string(),
            mime_type: mime_type.to_string(),
            created_time: None,
        }
    }

    #[test]
    fn test_still_image_filter() {
        assert!(entry("image/jpeg").is_still_image());
        assert!(entry("image/gif").is_still_image());
        assert!(!entry("video/mp4").is_still_image());
        assert!(!entry("image/x-video-thumbnail").is_still_image());
        assert!(!entry(FOLDER_MIME_TYPE).is_still_image());
    }

    #[test]
    fn test_folder_detection() {
        assert!(entry(FOLDER_MIME_TYPE).is_folder());
        assert!(!entry("image/png").is_folder());
    }
}
