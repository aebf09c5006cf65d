//! Google Drive API connector implementation
//!
//! Implements the `RemoteTreeClient` trait for Google Drive API v3.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::storage::{
    RemoteEntry, RemoteFolder, RemoteTreeClient, RemoteTreeClientFactory, FOLDER_MIME_TYPE,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::GoogleDriveError;
use crate::types::{DriveFile, DriveFolderMetadata, FilesListResponse};

/// Google Drive API base URL
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Maximum results per page (Google Drive API limit)
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Fields to request for file resources
const FILE_FIELDS: &str = "id,name,mimeType,createdTime";

/// Fields to request for folder metadata
const FOLDER_FIELDS: &str = "id,name,createdTime";

/// Per-request timeout for metadata calls
const METADATA_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-request timeout for content downloads
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Google Drive API connector
///
/// Bound to a single OAuth access token. Every operation is one HTTP request
/// with no retry; non-2xx answers become `BridgeError::Upstream`.
///
/// # Limitations
///
/// Listings are a single page of at most [`MAX_PAGE_SIZE`] entries.
/// `nextPageToken` is not followed.
///
/// # Example
///
/// ```ignore
/// use provider_google_drive::GoogleDriveConnector;
/// use bridge_traits::storage::RemoteTreeClient;
///
/// let connector = GoogleDriveConnector::new(http_client, access_token);
/// let folders = connector.list_children(parent_id, true).await?;
/// ```
pub struct GoogleDriveConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// OAuth 2.0 access token
    access_token: String,

    /// API base URL
    api_base: String,
}

impl GoogleDriveConnector {
    /// Create a new Google Drive connector
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `access_token` - OAuth 2.0 access token with `drive.readonly` scope
    pub fn new(http_client: Arc<dyn HttpClient>, access_token: impl Into<String>) -> Self {
        Self {
            http_client,
            access_token: access_token.into(),
            api_base: DRIVE_API_BASE.to_string(),
        }
    }

    /// Point the connector at a different API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Parse an optional RFC 3339 timestamp; a present but malformed value
    /// is a decode error.
    fn parse_timestamp(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
        value
            .map(|raw| {
                DateTime::parse_from_rfc3339(raw)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| {
                        BridgeError::from(GoogleDriveError::ParseError(format!(
                            "Invalid createdTime '{}': {}",
                            raw, e
                        )))
                    })
            })
            .transpose()
    }

    fn convert_file(drive_file: DriveFile) -> Result<RemoteEntry> {
        let created_time = Self::parse_timestamp(drive_file.created_time.as_deref())?;

        Ok(RemoteEntry {
            id: drive_file.id,
            name: drive_file.name,
            mime_type: drive_file.mime_type,
            created_time,
        })
    }

    /// Build the files.list query for the children of one container.
    fn children_query(container_id: &str, folders_only: bool) -> String {
        let escaped = container_id.replace('\\', "\\\\").replace('\'', "\\'");
        let mut query = format!("'{}' in parents and trashed = false", escaped);
        if folders_only {
            query.push_str(&format!(" and mimeType = '{}'", FOLDER_MIME_TYPE));
        }
        query
    }

    /// Execute one GET request and reject non-2xx answers.
    async fn get(&self, url: String, timeout: Duration, json: bool) -> Result<HttpResponse> {
        let mut request = HttpRequest::new(HttpMethod::Get, url)
            .bearer_token(&self.access_token)
            .timeout(timeout);
        if json {
            request = request.header("Accept", "application/json");
        }

        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            let status = response.status;
            let message = String::from_utf8_lossy(&response.body).to_string();
            warn!(status, "Google Drive API request failed");
            return Err(GoogleDriveError::ApiError {
                status_code: status,
                message,
            }
            .into());
        }

        debug!(status = response.status, "Google Drive API request succeeded");
        Ok(response)
    }

    fn decode<T: serde::de::DeserializeOwned>(response: &HttpResponse) -> Result<T> {
        serde_json::from_slice(&response.body)
            .map_err(|e| BridgeError::from(GoogleDriveError::ParseError(e.to_string())))
    }
}

#[async_trait]
impl RemoteTreeClient for GoogleDriveConnector {
    #[instrument(skip(self))]
    async fn list_children(
        &self,
        container_id: &str,
        folders_only: bool,
    ) -> Result<Vec<RemoteEntry>> {
        let query = Self::children_query(container_id, folders_only);
        let url = format!(
            "{}/files?q={}&fields={}&pageSize={}",
            self.api_base,
            urlencoding::encode(&query),
            urlencoding::encode(&format!("nextPageToken,files({})", FILE_FIELDS)),
            MAX_PAGE_SIZE
        );

        let response = self.get(url, METADATA_TIMEOUT, true).await?;
        let list: FilesListResponse = Self::decode(&response)?;

        if list.next_page_token.is_some() {
            warn!(
                page_size = MAX_PAGE_SIZE,
                "Listing truncated; entries beyond the first page are ignored"
            );
        }

        let entries = list
            .files
            .into_iter()
            .map(Self::convert_file)
            .collect::<Result<Vec<_>>>()?;

        info!(count = entries.len(), "Listed Google Drive children");
        Ok(entries)
    }

    #[instrument(skip(self))]
    async fn get_metadata(&self, container_id: &str) -> Result<RemoteFolder> {
        let url = format!(
            "{}/files/{}?fields={}",
            self.api_base,
            urlencoding::encode(container_id),
            urlencoding::encode(FOLDER_FIELDS)
        );

        let response = self.get(url, METADATA_TIMEOUT, true).await?;
        let metadata: DriveFolderMetadata = Self::decode(&response)?;

        Ok(RemoteFolder {
            created_time: Self::parse_timestamp(metadata.created_time.as_deref())?,
            id: metadata.id,
            name: metadata.name,
        })
    }

    #[instrument(skip(self))]
    async fn fetch_bytes(&self, item_id: &str) -> Result<Bytes> {
        let url = format!(
            "{}/files/{}?alt=media",
            self.api_base,
            urlencoding::encode(item_id)
        );

        let response = self.get(url, DOWNLOAD_TIMEOUT, false).await?;
        debug!(bytes = response.body.len(), "Downloaded file content");
        Ok(response.body)
    }
}

/// Builds a [`GoogleDriveConnector`] per resolved access token.
pub struct GoogleDriveConnectorFactory {
    http_client: Arc<dyn HttpClient>,
    api_base: String,
}

impl GoogleDriveConnectorFactory {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            api_base: DRIVE_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

impl RemoteTreeClientFactory for GoogleDriveConnectorFactory {
    fn connect(&self, access_token: &str) -> Arc<dyn RemoteTreeClient> {
        Arc::new(
            GoogleDriveConnector::new(Arc::clone(&self.http_client), access_token)
                .with_api_base(self.api_base.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
        }
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn decoded_query(url: &str) -> String {
        let q = url
            .split("q=")
            .nth(1)
            .and_then(|rest| rest.split('&').next())
            .unwrap();
        urlencoding::decode(q).unwrap().into_owned()
    }

    #[test]
    fn test_children_query() {
        assert_eq!(
            GoogleDriveConnector::children_query("abc", false),
            "'abc' in parents and trashed = false"
        );
        assert_eq!(
            GoogleDriveConnector::children_query("abc", true),
            "'abc' in parents and trashed = false and mimeType = 'application/vnd.google-apps.folder'"
        );
        assert_eq!(
            GoogleDriveConnector::children_query("a'b", false),
            "'a\\'b' in parents and trashed = false"
        );
    }

    #[tokio::test]
    async fn test_list_children_success() {
        let mut mock_http = MockHttpClient::new();

        mock_http
            .expect_execute()
            .withf(|req| {
                req.method == HttpMethod::Get
                    && req.url.starts_with("https://www.googleapis.com/drive/v3/files?")
                    && req.url.contains("pageSize=1000")
                    && decoded_query(&req.url) == "'folder-1' in parents and trashed = false"
                    && req.headers.get("Authorization") == Some(&"Bearer test_token".to_string())
            })
            .times(1)
            .returning(|_| {
                Ok(ok(r#"{
                    "files": [
                        {
                            "id": "file1",
                            "name": "stage.jpg",
                            "mimeType": "image/jpeg",
                            "createdTime": "2024-03-01T18:30:00.000Z"
                        },
                        {
                            "id": "file2",
                            "name": "clip.mp4",
                            "mimeType": "video/mp4"
                        }
                    ]
                }"#))
            });

        let connector = GoogleDriveConnector::new(Arc::new(mock_http), "test_token");
        let entries = connector.list_children("folder-1", false).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "file1");
        assert_eq!(
            entries[0].created_time.map(|t| t.timestamp()),
            Some(1_709_317_800)
        );
        assert_eq!(entries[1].created_time, None);
    }

    #[tokio::test]
    async fn test_list_children_folders_only() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|req| decoded_query(&req.url).ends_with(&format!("mimeType = '{}'", FOLDER_MIME_TYPE)))
            .times(1)
            .returning(|_| Ok(ok(r#"{"files": []}"#)));

        let connector = GoogleDriveConnector::new(Arc::new(mock_http), "test_token");
        let entries = connector.list_children("parent", true).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_get_metadata_success() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|req| req.url.starts_with("https://www.googleapis.com/drive/v3/files/folder-9?"))
            .times(1)
            .returning(|_| {
                Ok(ok(r#"{
                    "id": "folder-9",
                    "name": "Miami Launch",
                    "createdTime": "2025-01-05T12:00:00Z"
                }"#))
            });

        let connector = GoogleDriveConnector::new(Arc::new(mock_http), "test_token");
        let folder = connector.get_metadata("folder-9").await.unwrap();

        assert_eq!(folder.id, "folder-9");
        assert_eq!(folder.name, "Miami Launch");
        assert!(folder.created_time.is_some());
    }

    #[tokio::test]
    async fn test_fetch_bytes_success() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|req| req.url == "https://www.googleapis.com/drive/v3/files/file1?alt=media")
            .times(1)
            .returning(|_| Ok(ok("\u{FF}\u{D8}jpeg")));

        let connector = GoogleDriveConnector::new(Arc::new(mock_http), "test_token");
        let bytes = connector.fetch_bytes("file1").await.unwrap();

        assert_eq!(bytes, Bytes::from("\u{FF}\u{D8}jpeg"));
    }

    #[tokio::test]
    async fn test_api_error_is_upstream_without_retry() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|_| {
            Ok(HttpResponse {
                status: 503,
                headers: HashMap::new(),
                body: Bytes::from("backendError"),
            })
        });

        let connector = GoogleDriveConnector::new(Arc::new(mock_http), "test_token");
        let err = connector.list_children("folder-1", false).await.unwrap_err();

        match err {
            BridgeError::Upstream { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "backendError");
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_entry_is_invalid_response() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(ok(r#"{"files": [{"id": "file1", "name": "x.jpg"}]}"#)));

        let connector = GoogleDriveConnector::new(Arc::new(mock_http), "test_token");
        let err = connector.list_children("folder-1", false).await.unwrap_err();

        assert!(matches!(err, BridgeError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_bad_timestamp_is_invalid_response() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|_| {
            Ok(ok(r#"{"files": [{
                "id": "file1",
                "name": "x.jpg",
                "mimeType": "image/jpeg",
                "createdTime": "yesterday"
            }]}"#))
        });

        let connector = GoogleDriveConnector::new(Arc::new(mock_http), "test_token");
        let err = connector.list_children("folder-1", false).await.unwrap_err();

        assert!(matches!(err, BridgeError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_factory_binds_token() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|req| req.headers.get("Authorization") == Some(&"Bearer fresh".to_string()))
            .times(1)
            .returning(|_| Ok(ok(r#"{"files": []}"#)));

        let factory = GoogleDriveConnectorFactory::new(Arc::new(mock_http));
        let client = factory.connect("fresh");
        client.list_children("root", true).await.unwrap();
    }
}
