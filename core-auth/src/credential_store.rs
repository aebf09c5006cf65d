//! # Credential Store
//!
//! Persistence for the delegated Google credential of each principal.
//!
//! Rows live in the `oauth_credentials` table created by the catalog
//! migrations. The store never deletes rows; a disconnected principal keeps
//! its row with `connected = 0`.

use crate::error::{AuthError, Result};
use crate::types::{Credential, PrincipalId};
use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

// ============================================================================
// Store Trait
// ============================================================================

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the credential row of a principal, if any.
    async fn find(&self, principal: &PrincipalId) -> Result<Option<Credential>>;

    /// Create or overwrite the credential of a principal.
    ///
    /// When `credential.refresh_token` is `None` an already stored refresh
    /// token is kept.
    async fn upsert(&self, credential: &Credential) -> Result<()>;

    /// Replace the access token and expiry in a single update, leaving the
    /// refresh token untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotConnected`] if the principal has no row.
    async fn update_access_token(
        &self,
        principal: &PrincipalId,
        access_token: &str,
        expires_at: i64,
        updated_at: i64,
    ) -> Result<()>;
}

// ============================================================================
// SQLite Implementation
// ============================================================================

pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

impl SqliteCredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CredentialRow {
    principal_id: String,
    access_token: String,
    refresh_token: Option<String>,
    expires_at: i64,
    connected: bool,
    updated_at: i64,
}

impl From<CredentialRow> for Credential {
    fn from(row: CredentialRow) -> Self {
        Credential {
            principal_id: PrincipalId::new(row.principal_id),
            access_token: row.access_token,
            refresh_token: row.refresh_token,
            expires_at: row.expires_at,
            connected: row.connected,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn find(&self, principal: &PrincipalId) -> Result<Option<Credential>> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT principal_id, access_token, refresh_token, expires_at, connected, updated_at
            FROM oauth_credentials
            WHERE principal_id = ?
            "#,
        )
        .bind(principal.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Credential::from))
    }

    async fn upsert(&self, credential: &Credential) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO oauth_credentials (
                principal_id, access_token, refresh_token, expires_at, connected, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(principal_id) DO UPDATE SET
                access_token = excluded.access_token,
                refresh_token = COALESCE(excluded.refresh_token, oauth_credentials.refresh_token),
                expires_at = excluded.expires_at,
                connected = excluded.connected,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(credential.principal_id.as_str())
        .bind(&credential.access_token)
        .bind(&credential.refresh_token)
        .bind(credential.expires_at)
        .bind(credential.connected)
        .bind(credential.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(principal = %credential.principal_id, "Stored credential");
        Ok(())
    }

    async fn update_access_token(
        &self,
        principal: &PrincipalId,
        access_token: &str,
        expires_at: i64,
        updated_at: i64,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE oauth_credentials
            SET access_token = ?, expires_at = ?, updated_at = ?
            WHERE principal_id = ?
            "#,
        )
        .bind(access_token)
        .bind(expires_at)
        .bind(updated_at)
        .bind(principal.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::NotConnected);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query(
            r#"
            CREATE TABLE oauth_credentials (
                principal_id TEXT PRIMARY KEY NOT NULL,
                access_token TEXT NOT NULL,
                refresh_token TEXT,
                expires_at INTEGER NOT NULL,
                connected INTEGER NOT NULL DEFAULT 1,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    fn credential(access: &str, refresh: Option<&str>) -> Credential {
        Credential {
            principal_id: PrincipalId::new("user-1"),
            access_token: access.to_string(),
            refresh_token: refresh.map(str::to_string),
            expires_at: 2_000,
            connected: true,
            updated_at: 1_000,
        }
    }

    #[tokio::test]
    async fn test_upsert_and_find() {
        let store = SqliteCredentialStore::new(create_test_pool().await);
        store.upsert(&credential("a1", Some("r1"))).await.unwrap();

        let found = store
            .find(&PrincipalId::new("user-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.access_token, "a1");
        assert_eq!(found.refresh_token.as_deref(), Some("r1"));
        assert!(found.connected);

        assert!(store
            .find(&PrincipalId::new("nobody"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_upsert_keeps_refresh_token_when_omitted() {
        let store = SqliteCredentialStore::new(create_test_pool().await);
        store.upsert(&credential("a1", Some("r1"))).await.unwrap();
        store.upsert(&credential("a2", None)).await.unwrap();

        let found = store
            .find(&PrincipalId::new("user-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.access_token, "a2");
        assert_eq!(found.refresh_token.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn test_update_access_token_leaves_refresh_token() {
        let store = SqliteCredentialStore::new(create_test_pool().await);
        store.upsert(&credential("a1", Some("r1"))).await.unwrap();

        store
            .update_access_token(&PrincipalId::new("user-1"), "a-new", 9_000, 5_000)
            .await
            .unwrap();

        let found = store
            .find(&PrincipalId::new("user-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.access_token, "a-new");
        assert_eq!(found.expires_at, 9_000);
        assert_eq!(found.updated_at, 5_000);
        assert_eq!(found.refresh_token.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn test_update_missing_principal() {
        let store = SqliteCredentialStore::new(create_test_pool().await);
        let result = store
            .update_access_token(&PrincipalId::new("ghost"), "a", 1, 1)
            .await;

        assert!(matches!(result, Err(AuthError::NotConnected)));
    }
}
