//! # Catalog Store
//!
//! Owns the gallery database: events, photos and the sync-attempt log.
//!
//! ## Overview
//!
//! This crate manages:
//! - SQLite connection pooling and embedded migrations ([`db`])
//! - Domain models with validation ([`models`])
//! - Repository traits with SQLite implementations ([`repositories`])
//! - Slug derivation for new events ([`slug`])

pub mod db;
pub mod error;
pub mod models;
pub mod repositories;
pub mod slug;

pub use db::{create_pool, create_test_pool, health_check, DatabaseConfig};
pub use error::{LibraryError, Result};
pub use models::{Event, Photo, PhotoSource, SyncLog, SyncLogStatus};
pub use repositories::{
    EventRepository, PhotoRepository, SqliteEventRepository, SqlitePhotoRepository,
    SqliteSyncLogRepository, SyncLogRepository,
};
pub use slug::{derive_slug, slugify, unique_suffix};
