//! # Engine Configuration Module
//!
//! Provides configuration management for the event gallery sync engine.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct an
//! `EngineConfig` holding every setting the engine and its HTTP entry points
//! need. It enforces fail-fast validation so a misconfigured deployment stops
//! at startup with a message naming the missing setting, instead of failing
//! on the first sync request.
//!
//! ## Required Settings
//!
//! - Google OAuth client id and secret
//! - Database path
//! - Object storage backend (REST storage API or local filesystem)
//!
//! ## Optional Settings (with defaults)
//!
//! - Photo bucket (`event-photos`)
//! - Bind address (`127.0.0.1:8787`)
//! - Public base URL (`http://<bind address>`)
//! - Logging (`LoggingConfig::default()`)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{EngineConfig, ObjectStoreConfig};
//!
//! let config = EngineConfig::builder()
//!     .google_client_id("client-id.apps.googleusercontent.com")
//!     .google_client_secret("secret")
//!     .database_path("/var/lib/gallery/sync.db")
//!     .object_store(ObjectStoreConfig::Local {
//!         root: "/var/lib/gallery/objects".into(),
//!         public_url: "https://gallery.example.com/objects".to_string(),
//!     })
//!     .build()?;
//! ```
//!
//! ## Environment
//!
//! [`EngineConfig::from_env`] reads the same settings from process
//! environment variables:
//!
//! | Variable | Setting |
//! |----------|---------|
//! | `GOOGLE_CLIENT_ID` | OAuth client id |
//! | `GOOGLE_CLIENT_SECRET` | OAuth client secret |
//! | `PHOTO_BUCKET` | Bucket for ingested photos |
//! | `PUBLIC_BASE_URL` | Externally visible base URL |
//! | `DATABASE_PATH` | SQLite database file |
//! | `BIND_ADDR` | Listen address |
//! | `OBJECT_STORE_URL`, `OBJECT_STORE_SERVICE_KEY` | REST storage API |
//! | `OBJECT_STORE_ROOT`, `OBJECT_STORE_PUBLIC_URL` | Local filesystem storage |
//! | `LOG_FORMAT`, `LOG_LEVEL`, `LOG_FILTER` | Logging |

use crate::error::{Error, Result};
use crate::logging::{redact_if_sensitive, LogFormat, LoggingConfig};
use bridge_traits::time::LogLevel;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default bucket for photos copied out of the remote tree.
pub const DEFAULT_PHOTO_BUCKET: &str = "event-photos";

/// Default listen address for the HTTP entry points.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

/// Path of the OAuth callback route, relative to the public base URL.
pub const OAUTH_CALLBACK_PATH: &str = "/api/auth/google/callback";

/// Object storage backend selection.
#[derive(Clone, PartialEq, Eq)]
pub enum ObjectStoreConfig {
    /// Hosted storage REST API authenticated with a service key
    Rest { url: String, service_key: String },
    /// Directory on the local filesystem, served under `public_url`
    Local { root: PathBuf, public_url: String },
}

impl std::fmt::Debug for ObjectStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectStoreConfig::Rest { url, service_key } => f
                .debug_struct("Rest")
                .field("url", url)
                .field(
                    "service_key",
                    &redact_if_sensitive("service_key", service_key),
                )
                .finish(),
            ObjectStoreConfig::Local { root, public_url } => f
                .debug_struct("Local")
                .field("root", root)
                .field("public_url", public_url)
                .finish(),
        }
    }
}

/// Engine configuration.
///
/// Holds every setting required to bootstrap the sync engine. Use
/// [`EngineConfigBuilder`] or [`EngineConfig::from_env`] to construct
/// instances.
#[derive(Clone)]
pub struct EngineConfig {
    /// Google OAuth client id
    pub google_client_id: String,

    /// Google OAuth client secret
    pub google_client_secret: String,

    /// Bucket that ingested photos are written to
    pub photo_bucket: String,

    /// Externally visible base URL (scheme + host, no trailing slash)
    pub public_base_url: String,

    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// Listen address for the HTTP entry points
    pub bind_addr: SocketAddr,

    /// Object storage backend
    pub object_store: ObjectStoreConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("google_client_id", &self.google_client_id)
            .field(
                "google_client_secret",
                &redact_if_sensitive("google_client_secret", &self.google_client_secret),
            )
            .field("photo_bucket", &self.photo_bucket)
            .field("public_base_url", &self.public_base_url)
            .field("database_path", &self.database_path)
            .field("bind_addr", &self.bind_addr)
            .field("object_store", &self.object_store)
            .field("logging", &self.logging)
            .finish()
    }
}

impl EngineConfig {
    /// Creates a new builder for constructing an `EngineConfig`.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut builder = Self::builder();

        if let Some(v) = get("GOOGLE_CLIENT_ID") {
            builder = builder.google_client_id(v);
        }
        if let Some(v) = get("GOOGLE_CLIENT_SECRET") {
            builder = builder.google_client_secret(v);
        }
        if let Some(v) = get("PHOTO_BUCKET") {
            builder = builder.photo_bucket(v);
        }
        if let Some(v) = get("PUBLIC_BASE_URL") {
            builder = builder.public_base_url(v);
        }
        if let Some(v) = get("DATABASE_PATH") {
            builder = builder.database_path(v);
        }
        if let Some(v) = get("BIND_ADDR") {
            let addr = v
                .parse::<SocketAddr>()
                .map_err(|e| Error::Config(format!("BIND_ADDR '{}' is invalid: {}", v, e)))?;
            builder = builder.bind_addr(addr);
        }

        match (get("OBJECT_STORE_URL"), get("OBJECT_STORE_ROOT")) {
            (Some(url), _) => {
                let service_key = get("OBJECT_STORE_SERVICE_KEY").ok_or_else(|| {
                    Error::Config(
                        "OBJECT_STORE_SERVICE_KEY is required when OBJECT_STORE_URL is set"
                            .to_string(),
                    )
                })?;
                builder = builder.object_store(ObjectStoreConfig::Rest { url, service_key });
            }
            (None, Some(root)) => {
                let public_url = get("OBJECT_STORE_PUBLIC_URL").ok_or_else(|| {
                    Error::Config(
                        "OBJECT_STORE_PUBLIC_URL is required when OBJECT_STORE_ROOT is set"
                            .to_string(),
                    )
                })?;
                builder = builder.object_store(ObjectStoreConfig::Local {
                    root: PathBuf::from(root),
                    public_url,
                });
            }
            (None, None) => {}
        }

        let mut logging = LoggingConfig::default();
        if let Some(v) = get("LOG_FORMAT") {
            let format = LogFormat::parse(&v)
                .ok_or_else(|| Error::Config(format!("LOG_FORMAT '{}' is not recognised", v)))?;
            logging = logging.with_format(format);
        }
        if let Some(v) = get("LOG_LEVEL") {
            let level = LogLevel::parse(&v)
                .ok_or_else(|| Error::Config(format!("LOG_LEVEL '{}' is not recognised", v)))?;
            logging = logging.with_level(level);
        }
        if let Some(v) = get("LOG_FILTER") {
            logging = logging.with_filter(v);
        }

        builder.logging(logging).build()
    }

    /// Redirect URI registered with the OAuth provider.
    pub fn oauth_redirect_uri(&self) -> String {
        format!("{}{}", self.public_base_url, OAUTH_CALLBACK_PATH)
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - OAuth client credentials are not blank
    /// - Bucket name is a single path segment
    /// - Public base URL is an http(s) URL
    /// - Object storage settings are complete
    pub fn validate(&self) -> Result<()> {
        if self.google_client_id.trim().is_empty() {
            return Err(Error::Config("Google client id cannot be empty".to_string()));
        }

        if self.google_client_secret.trim().is_empty() {
            return Err(Error::Config(
                "Google client secret cannot be empty".to_string(),
            ));
        }

        if self.database_path.as_os_str().is_empty() {
            return Err(Error::Config("Database path cannot be empty".to_string()));
        }

        if self.photo_bucket.is_empty()
            || self.photo_bucket.contains('/')
            || self.photo_bucket.starts_with('.')
        {
            return Err(Error::Config(format!(
                "Photo bucket '{}' must be a single non-empty path segment",
                self.photo_bucket
            )));
        }

        if !is_http_url(&self.public_base_url) {
            return Err(Error::Config(format!(
                "Public base URL '{}' must start with http:// or https://",
                self.public_base_url
            )));
        }

        match &self.object_store {
            ObjectStoreConfig::Rest { url, service_key } => {
                if !is_http_url(url) {
                    return Err(Error::Config(format!(
                        "Object store URL '{}' must start with http:// or https://",
                        url
                    )));
                }
                if service_key.trim().is_empty() {
                    return Err(Error::Config(
                        "Object store service key cannot be empty".to_string(),
                    ));
                }
            }
            ObjectStoreConfig::Local { root, public_url } => {
                if root.as_os_str().is_empty() {
                    return Err(Error::Config(
                        "Object store root cannot be empty".to_string(),
                    ));
                }
                if !is_http_url(public_url) {
                    return Err(Error::Config(format!(
                        "Object store public URL '{}' must start with http:// or https://",
                        public_url
                    )));
                }
            }
        }

        Ok(())
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn object_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "ObjectStore".to_string(),
        message: "An object storage backend is required for ingested photos. \
                  Set OBJECT_STORE_URL and OBJECT_STORE_SERVICE_KEY for the storage REST API, \
                  or OBJECT_STORE_ROOT and OBJECT_STORE_PUBLIC_URL for a local directory."
            .to_string(),
    }
}

/// Builder for constructing [`EngineConfig`] instances.
///
/// Use this builder to incrementally set configuration options and then
/// call [`build()`](EngineConfigBuilder::build) to create the final config.
#[derive(Default)]
pub struct EngineConfigBuilder {
    google_client_id: Option<String>,
    google_client_secret: Option<String>,
    photo_bucket: Option<String>,
    public_base_url: Option<String>,
    database_path: Option<PathBuf>,
    bind_addr: Option<SocketAddr>,
    object_store: Option<ObjectStoreConfig>,
    logging: Option<LoggingConfig>,
}

impl EngineConfigBuilder {
    /// Sets the Google OAuth client id.
    pub fn google_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.google_client_id = Some(client_id.into());
        self
    }

    /// Sets the Google OAuth client secret.
    pub fn google_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.google_client_secret = Some(secret.into());
        self
    }

    /// Sets the bucket ingested photos are written to.
    ///
    /// Default: `event-photos`
    pub fn photo_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.photo_bucket = Some(bucket.into());
        self
    }

    /// Sets the externally visible base URL used to build the OAuth
    /// redirect URI. A trailing slash is removed.
    ///
    /// Default: `http://<bind address>`
    pub fn public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = Some(url.into());
        self
    }

    /// Sets the database path.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_runtime::config::EngineConfig;
    ///
    /// let builder = EngineConfig::builder()
    ///     .database_path("/path/to/sync.db");
    /// ```
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Sets the listen address.
    ///
    /// Default: `127.0.0.1:8787`
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = Some(addr);
        self
    }

    /// Sets the object storage backend.
    pub fn object_store(mut self, object_store: ObjectStoreConfig) -> Self {
        self.object_store = Some(object_store);
        self
    }

    /// Sets the logging configuration.
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Builds the final `EngineConfig` instance.
    ///
    /// Returns an error naming the missing setting when a required value was
    /// not provided, or when the resulting configuration fails validation.
    pub fn build(self) -> Result<EngineConfig> {
        let google_client_id = self.google_client_id.ok_or_else(|| {
            Error::Config(
                "Google client id is required. Set GOOGLE_CLIENT_ID or use .google_client_id()."
                    .to_string(),
            )
        })?;

        let google_client_secret = self.google_client_secret.ok_or_else(|| {
            Error::Config(
                "Google client secret is required. Set GOOGLE_CLIENT_SECRET or use .google_client_secret()."
                    .to_string(),
            )
        })?;

        let database_path = self.database_path.ok_or_else(|| {
            Error::Config(
                "Database path is required. Set DATABASE_PATH or use .database_path()."
                    .to_string(),
            )
        })?;

        let object_store = self.object_store.ok_or_else(object_store_missing_error)?;

        let bind_addr = match self.bind_addr {
            Some(addr) => addr,
            None => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|e| Error::Internal(format!("Default bind address invalid: {}", e)))?,
        };

        let public_base_url = self
            .public_base_url
            .unwrap_or_else(|| format!("http://{}", bind_addr))
            .trim_end_matches('/')
            .to_string();

        let config = EngineConfig {
            google_client_id,
            google_client_secret,
            photo_bucket: self
                .photo_bucket
                .unwrap_or_else(|| DEFAULT_PHOTO_BUCKET.to_string()),
            public_base_url,
            database_path,
            bind_addr,
            object_store,
            logging: self.logging.unwrap_or_default(),
        };

        config.validate()?;

        Ok(config)
    }
}
