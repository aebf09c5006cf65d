use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the authenticated operator owning one credential row.
///
/// # Examples
///
/// ```
/// use core_auth::PrincipalId;
///
/// let principal = PrincipalId::new("user-42");
/// assert_eq!(principal.as_str(), "user-42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(String);

impl PrincipalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PrincipalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PrincipalId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Bearer token for the remote service.
///
/// `Debug` never prints the token value.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Persisted delegated credential for one principal.
///
/// Timestamps are Unix seconds.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub principal_id: PrincipalId,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: i64,
    pub connected: bool,
    pub updated_at: i64,
}

impl Credential {
    /// A credential whose expiry is at or before `now` must be refreshed.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("principal_id", &self.principal_id)
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_at", &self.expires_at)
            .field("connected", &self.connected)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Tokens returned by the OAuth token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds
    pub expires_in: i64,
}

impl OAuthTokens {
    pub fn new(access_token: String, refresh_token: Option<String>, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_in,
        }
    }

    /// Absolute expiry for tokens received at `now`.
    pub fn expires_at(&self, now: i64) -> i64 {
        now.saturating_add(self.expires_in)
    }
}

impl fmt::Debug for OAuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthTokens")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_in", &self.expires_in)
            .finish()
    }
}
