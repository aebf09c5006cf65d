//! # Google Drive Provider
//!
//! Implements the `RemoteTreeClient` trait for Google Drive API v3.
//!
//! ## Overview
//!
//! This module provides:
//! - Single-page child listing of a folder (`trashed = false`), optionally
//!   restricted to sub-folders
//! - Folder metadata lookup
//! - Raw content download (`alt=media`)
//! - A factory that binds a connector to a resolved access token

pub mod connector;
pub mod error;
pub mod types;

pub use connector::{GoogleDriveConnector, GoogleDriveConnectorFactory, MAX_PAGE_SIZE};
pub use error::{GoogleDriveError, Result};
