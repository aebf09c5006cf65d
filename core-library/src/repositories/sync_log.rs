//! Sync-attempt log repository

use crate::error::{LibraryError, Result};
use crate::models::{SyncLog, SyncLogStatus};
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

#[async_trait]
pub trait SyncLogRepository: Send + Sync {
    /// Persist a newly opened attempt
    async fn insert(&self, log: &SyncLog) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<SyncLog>>;

    /// Attach the attempt to the event it resolved to
    async fn link_event(&self, id: &str, event_id: &str) -> Result<()>;

    /// Persist the terminal state of an attempt.
    ///
    /// Only running rows are updated.
    ///
    /// # Errors
    /// Returns `InvalidStateTransition` if `log` is still running or the
    /// stored row already reached a terminal state, and `NotFound` if no row
    /// exists.
    async fn complete(&self, log: &SyncLog) -> Result<()>;

    /// Most recent attempts for an event, newest first
    async fn list_by_event(&self, event_id: &str, limit: i64) -> Result<Vec<SyncLog>>;
}

pub struct SqliteSyncLogRepository {
    pool: SqlitePool,
}

impl SqliteSyncLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SYNC_LOG_COLUMNS: &str =
    "id, event_id, status, photos_added, error_message, started_at, completed_at";

#[async_trait]
impl SyncLogRepository for SqliteSyncLogRepository {
    async fn insert(&self, log: &SyncLog) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sync_logs (
                id, event_id, status, photos_added, error_message, started_at, completed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&log.id)
        .bind(&log.event_id)
        .bind(log.status)
        .bind(log.photos_added)
        .bind(&log.error_message)
        .bind(log.started_at)
        .bind(log.completed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| LibraryError::from_insert(e, "SyncLog", &log.id))?;

        debug!(sync_log_id = %log.id, "Opened sync log");
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<SyncLog>> {
        let sql = format!("SELECT {SYNC_LOG_COLUMNS} FROM sync_logs WHERE id = ?");
        let log = sqlx::query_as::<_, SyncLog>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(log)
    }

    async fn link_event(&self, id: &str, event_id: &str) -> Result<()> {
        let result = sqlx::query("UPDATE sync_logs SET event_id = ? WHERE id = ?")
            .bind(event_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(LibraryError::NotFound {
                entity_type: "SyncLog".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn complete(&self, log: &SyncLog) -> Result<()> {
        if !log.status.is_terminal() {
            return Err(LibraryError::InvalidStateTransition {
                from: SyncLogStatus::Running.to_string(),
                to: log.status.to_string(),
            });
        }

        let result = sqlx::query(
            r#"
            UPDATE sync_logs
            SET status = ?, photos_added = ?, error_message = ?, completed_at = ?
            WHERE id = ? AND status = 'running'
            "#,
        )
        .bind(log.status)
        .bind(log.photos_added)
        .bind(&log.error_message)
        .bind(log.completed_at)
        .bind(&log.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.find_by_id(&log.id).await? {
                Some(stored) => Err(LibraryError::InvalidStateTransition {
                    from: stored.status.to_string(),
                    to: log.status.to_string(),
                }),
                None => Err(LibraryError::NotFound {
                    entity_type: "SyncLog".to_string(),
                    id: log.id.clone(),
                }),
            };
        }

        debug!(sync_log_id = %log.id, status = %log.status, "Completed sync log");
        Ok(())
    }

    async fn list_by_event(&self, event_id: &str, limit: i64) -> Result<Vec<SyncLog>> {
        let sql = format!(
            "SELECT {SYNC_LOG_COLUMNS} FROM sync_logs WHERE event_id = ? \
             ORDER BY started_at DESC LIMIT ?"
        );
        let logs = sqlx::query_as::<_, SyncLog>(&sql)
            .bind(event_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(logs)
    }
}
