use bridge_traits::error::BridgeError;
use core_auth::AuthError;
use core_library::LibraryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// Credential could not be resolved; nothing was attempted
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Remote storage error: {0}")]
    Remote(#[from] BridgeError),

    #[error("Object storage error: {0}")]
    Storage(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] LibraryError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
