use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// No credential row for the principal, or the row is disconnected
    #[error("Google Drive is not connected")]
    NotConnected,

    /// The stored credential cannot be renewed without a new consent
    #[error("reconnect required: {0}")]
    ReconnectRequired(String),

    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),

    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error("Credential storage error: {0}")]
    CredentialStorage(String),

    #[error("{0}")]
    Other(String),
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::CredentialStorage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
