//! # Repository Pattern Implementation
//!
//! Repository traits and their SQLite implementations for the catalog.
//!
//! ## Architecture
//!
//! - Traits define the interface the sync pipeline is written against
//! - SQLite implementations use sqlx over a shared `SqlitePool`
//! - Unique-constraint violations surface as `LibraryError::Duplicate`
//!
//! ## Available Repositories
//!
//! - `EventRepository` - Events and their remote folder mapping
//! - `PhotoRepository` - Photos and the per-event de-dup key set
//! - `SyncLogRepository` - Sync-attempt audit records

pub mod event;
pub mod photo;
pub mod sync_log;

pub use event::{EventRepository, SqliteEventRepository};
pub use photo::{PhotoRepository, SqlitePhotoRepository};
pub use sync_log::{SqliteSyncLogRepository, SyncLogRepository};
