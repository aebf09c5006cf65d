//! Workspace entry crate.
//!
//! Re-exports the service façade so hosts can depend on a single crate and
//! reach the router, bootstrap helpers and the sync engine types through it.

pub use core_service::*;
