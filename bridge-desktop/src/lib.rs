//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for server and desktop hosts
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides production-ready implementations of the bridge traits:
//! - `HttpClient` using `reqwest`
//! - `ObjectStore` on the local filesystem using `tokio::fs`
//! - `ObjectStore` over a hosted storage REST API
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{LocalObjectStore, ReqwestHttpClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let http_client = Arc::new(ReqwestHttpClient::new()?);
//!     let store = LocalObjectStore::new("./objects", "http://localhost:8787/objects");
//!
//!     // Use in engine configuration
//!     Ok(())
//! }
//! ```

mod http;
mod object_store;

pub use http::ReqwestHttpClient;
pub use object_store::{LocalObjectStore, RestObjectStore};
