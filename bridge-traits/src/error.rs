use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The remote service answered with a non-success status.
    #[error("Upstream error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    /// The remote service answered with a body that does not match the
    /// expected schema.
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Upstream status code when the failure came from a remote response.
    pub fn status(&self) -> Option<u16> {
        match self {
            BridgeError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
