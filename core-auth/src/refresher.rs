//! # Credential Refresher
//!
//! Resolves a usable access token for a principal, exchanging the stored
//! refresh token when the access token has expired.

use crate::credential_store::CredentialStore;
use crate::error::{AuthError, Result};
use crate::oauth::OAuthFlowManager;
use crate::types::{AccessToken, Credential, PrincipalId};
use bridge_traits::time::Clock;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct CredentialRefresher {
    store: Arc<dyn CredentialStore>,
    oauth: Arc<OAuthFlowManager>,
    clock: Arc<dyn Clock>,
}

impl CredentialRefresher {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        oauth: Arc<OAuthFlowManager>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            oauth,
            clock,
        }
    }

    /// Exchange the stored refresh token for a new access token and persist
    /// it, regardless of the current expiry.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotConnected`] when no connected credential exists
    /// - [`AuthError::ReconnectRequired`] when no refresh token is stored
    /// - [`AuthError::TokenRefreshFailed`] when the exchange fails; the stored
    ///   credential is left unchanged
    #[instrument(skip(self), fields(principal = %principal))]
    pub async fn refresh(&self, principal: &PrincipalId) -> Result<AccessToken> {
        let credential = self.load_connected(principal).await?;
        self.refresh_credential(&credential).await
    }

    /// Return the stored access token, refreshing it first when it has
    /// expired. A valid token causes no token-endpoint traffic.
    #[instrument(skip(self), fields(principal = %principal))]
    pub async fn resolve_access_token(&self, principal: &PrincipalId) -> Result<AccessToken> {
        let credential = self.load_connected(principal).await?;
        let now = self.clock.unix_timestamp();

        if credential.is_expired(now) {
            debug!(
                expires_at = credential.expires_at,
                now, "Access token expired, refreshing"
            );
            return self.refresh_credential(&credential).await;
        }

        Ok(AccessToken::new(credential.access_token))
    }

    async fn load_connected(&self, principal: &PrincipalId) -> Result<Credential> {
        match self.store.find(principal).await? {
            Some(credential) if credential.connected => Ok(credential),
            _ => Err(AuthError::NotConnected),
        }
    }

    async fn refresh_credential(&self, credential: &Credential) -> Result<AccessToken> {
        let refresh_token = credential.refresh_token.as_deref().ok_or_else(|| {
            warn!("No refresh token stored");
            AuthError::ReconnectRequired(
                "no refresh token is stored for this account".to_string(),
            )
        })?;

        let tokens = self.oauth.refresh_access_token(refresh_token).await?;

        let now = self.clock.unix_timestamp();
        let expires_at = tokens.expires_at(now);
        self.store
            .update_access_token(
                &credential.principal_id,
                &tokens.access_token,
                expires_at,
                now,
            )
            .await?;

        info!(expires_at, "Access token refreshed");

        Ok(AccessToken::new(tokens.access_token))
    }
}
