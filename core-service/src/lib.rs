//! HTTP service for the event gallery sync engine.
//!
//! This crate wires the concrete bridge adapters (reqwest HTTP client, object
//! storage, SQLite catalog, Google Drive connector) into the sync engine and
//! exposes it through an axum router.

pub mod bootstrap;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;

pub use bootstrap::bootstrap;
pub use error::{ApiError, CoreError, Result};
pub use routes::build as build_router;
pub use session::{HeaderSessionResolver, SessionResolver, PRINCIPAL_HEADER};
pub use state::AppState;
