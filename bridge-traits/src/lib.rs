//! # Host Bridge Traits
//!
//! Platform abstraction traits the sync engine is written against.
//!
//! ## Overview
//!
//! This crate defines the contract between the engine and the concrete
//! adapters that talk to the outside world. Each trait represents a
//! capability the core requires but that is implemented elsewhere
//! (`bridge-desktop`, `provider-google-drive`) or faked in tests.
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Single-attempt async HTTP
//! - [`RemoteTreeClient`](storage::RemoteTreeClient) - Read-only view of a remote folder tree
//! - [`RemoteTreeClientFactory`](storage::RemoteTreeClientFactory) - Binds a client to an access token
//!
//! ### Storage
//! - [`ObjectStore`](storage::ObjectStore) - Bucketed object writes with public URLs
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Remote non-2xx
//! answers carry their status in `BridgeError::Upstream`; malformed bodies are
//! `BridgeError::InvalidResponse`.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so handles can be shared across
//! async tasks behind `Arc`.

pub mod error;
pub mod http;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use storage::{
    ObjectStore, RemoteEntry, RemoteFolder, RemoteTreeClient, RemoteTreeClientFactory,
    FOLDER_MIME_TYPE,
};
pub use time::{Clock, LogLevel, SystemClock};
