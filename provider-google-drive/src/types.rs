//! Google Drive API response types
//!
//! Data structures for deserializing Google Drive API v3 responses. Required
//! fields are non-optional so malformed bodies fail at decode time.

use serde::{Deserialize, Serialize};

/// Google Drive API file resource (the subset the engine requests)
///
/// See: https://developers.google.com/drive/api/v3/reference/files#resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// File ID
    pub id: String,

    /// File name
    pub name: String,

    /// MIME type
    pub mime_type: String,

    /// Creation time (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
}

/// Google Drive API files.list response
///
/// See: https://developers.google.com/drive/api/v3/reference/files/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesListResponse {
    /// List of files
    #[serde(default)]
    pub files: Vec<DriveFile>,

    /// Token for next page (not followed)
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Folder metadata returned by files.get
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFolderMetadata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_time: Option<String>,
}
