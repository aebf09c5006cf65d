//! Object Storage Implementations
//!
//! Two backends for the [`ObjectStore`] seam:
//! - [`LocalObjectStore`] writes objects below a root directory, one
//!   sub-directory per bucket, and serves them from a static base URL.
//! - [`RestObjectStore`] uploads through a storage REST API
//!   (`/storage/v1/object/...`) authenticated with a service key.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest},
    storage::ObjectStore,
};
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument, warn};

/// Reject keys that would escape the bucket directory.
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(BridgeError::OperationFailed("Object key is empty".to_string()));
    }

    let escapes = Path::new(key)
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if escapes {
        return Err(BridgeError::OperationFailed(format!(
            "Object key is not a plain relative path: {}",
            key
        )));
    }

    Ok(())
}

/// Write `data` into a file just created at `path`. A failed write removes
/// the file so the key can be written again.
async fn write_or_remove<W>(path: &Path, mut file: W, data: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        file.write_all(data).await?;
        file.flush().await
    }
    .await;

    if let Err(err) = written {
        drop(file);
        if let Err(remove_err) = fs::remove_file(path).await {
            warn!(path = ?path, error = %remove_err, "Failed to remove partial object");
        }
        return Err(BridgeError::Io(err));
    }

    Ok(())
}

fn encode_path(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

// ============================================================================
// Local filesystem
// ============================================================================

/// Filesystem-backed object store
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        validate_key(bucket)?;
        validate_key(key)?;
        Ok(self.root.join(bucket).join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    #[instrument(skip(self, data), fields(bytes = data.len()))]
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        _content_type: &str,
    ) -> Result<()> {
        let path = self.object_path(bucket, key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => BridgeError::OperationFailed(format!(
                    "Object already exists: {}/{}",
                    bucket, key
                )),
                _ => BridgeError::Io(e),
            })?;

        write_or_remove(&path, file, &data).await?;

        debug!(path = ?path, "Stored object");
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, bucket, encode_path(key))
    }
}

// ============================================================================
// REST storage API
// ============================================================================

/// Object store speaking the hosted storage REST API
pub struct RestObjectStore {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    service_key: String,
}

impl RestObjectStore {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        service_key: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for RestObjectStore {
    #[instrument(skip(self, data), fields(bytes = data.len()))]
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<()> {
        validate_key(bucket)?;
        validate_key(key)?;

        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            bucket,
            encode_path(key)
        );

        let request = HttpRequest::new(HttpMethod::Post, url)
            .bearer_token(&self.service_key)
            .header("apikey", self.service_key.clone())
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(data);

        let response = self.http_client.execute(request).await?;
        if !response.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(BridgeError::Upstream {
                status: response.status,
                message,
            });
        }

        debug!(bucket, key, "Uploaded object");
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            bucket,
            encode_path(key)
        )
    }
}
