//! Download record CRUD and state transitions.

use crate::error::DatabaseError;
use crate::types::{DownloadId, Status};
use crate::{Error, Result};

use super::{Database, Download, NewDownload};

impl Database {
    /// Insert a new download record in Pending state
    pub async fn insert_download(&self, download: &NewDownload) -> Result<DownloadId> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO downloads (
                url, title, thumbnail, format_id, format_label,
                status, progress, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&download.url)
        .bind(&download.title)
        .bind(&download.thumbnail)
        .bind(&download.format_id)
        .bind(&download.format_label)
        .bind(Status::Pending.to_i32())
        .bind(0i64) // progress
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to insert download: {}",
                e
            )))
        })?;

        Ok(DownloadId(result.last_insert_rowid()))
    }

    /// Get a download by ID
    pub async fn get_download(&self, id: DownloadId) -> Result<Option<Download>> {
        let row = sqlx::query_as::<_, Download>(
            r#"
            SELECT
                id, url, title, thumbnail, format_id, format_label,
                status, progress, file_path, error_message, created_at
            FROM downloads
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get download: {}",
                e
            )))
        })?;

        Ok(row)
    }

    /// List all downloads, newest first
    pub async fn list_downloads(&self) -> Result<Vec<Download>> {
        let rows = sqlx::query_as::<_, Download>(
            r#"
            SELECT
                id, url, title, thumbnail, format_id, format_label,
                status, progress, file_path, error_message, created_at
            FROM downloads
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list downloads: {}",
                e
            )))
        })?;

        Ok(rows)
    }

    /// Update download status
    pub async fn update_status(&self, id: DownloadId, status: Status) -> Result<()> {
        sqlx::query("UPDATE downloads SET status = ? WHERE id = ?")
            .bind(status.to_i32())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to update status: {}",
                    e
                )))
            })?;

        Ok(())
    }

    /// Update download progress percentage
    pub async fn update_progress(&self, id: DownloadId, progress: i64) -> Result<()> {
        sqlx::query("UPDATE downloads SET progress = ? WHERE id = ?")
            .bind(progress)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to update progress: {}",
                    e
                )))
            })?;

        Ok(())
    }

    /// Resolve a download as Completed
    ///
    /// Forces progress to 100 and records the artifact path; `file_path`
    /// is populated only through this transition.
    pub async fn mark_completed(&self, id: DownloadId, file_path: Option<&str>) -> Result<()> {
        sqlx::query(
            "UPDATE downloads SET status = ?, progress = 100, file_path = ? WHERE id = ?",
        )
        .bind(Status::Completed.to_i32())
        .bind(file_path)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to mark download completed: {}",
                e
            )))
        })?;

        Ok(())
    }

    /// Resolve a download as Cancelled
    ///
    /// Resets progress to 0 regardless of how far the download got.
    pub async fn mark_cancelled(&self, id: DownloadId) -> Result<()> {
        sqlx::query("UPDATE downloads SET status = ?, progress = 0 WHERE id = ?")
            .bind(Status::Cancelled.to_i32())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to mark download cancelled: {}",
                    e
                )))
            })?;

        Ok(())
    }

    /// Resolve a download as Error with a diagnostic message
    pub async fn mark_error(&self, id: DownloadId, error: &str) -> Result<()> {
        sqlx::query("UPDATE downloads SET status = ?, error_message = ? WHERE id = ?")
            .bind(Status::Error.to_i32())
            .bind(error)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to mark download errored: {}",
                    e
                )))
            })?;

        Ok(())
    }

    /// Delete a download record
    pub async fn delete_download(&self, id: DownloadId) -> Result<()> {
        sqlx::query("DELETE FROM downloads WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to delete download: {}",
                    e
                )))
            })?;

        Ok(())
    }

    /// List Completed downloads with an artifact, created before the cutoff
    ///
    /// These are the retention sweep targets: Error and Cancelled records
    /// never match (no file-producing terminal state), and neither do
    /// Completed records without a stored path.
    pub async fn list_retention_candidates(&self, cutoff: i64) -> Result<Vec<Download>> {
        let rows = sqlx::query_as::<_, Download>(
            r#"
            SELECT
                id, url, title, thumbnail, format_id, format_label,
                status, progress, file_path, error_message, created_at
            FROM downloads
            WHERE status = ? AND created_at < ? AND file_path IS NOT NULL
            ORDER BY created_at ASC
            "#,
        )
        .bind(Status::Completed.to_i32())
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list retention candidates: {}",
                e
            )))
        })?;

        Ok(rows)
    }

    /// Delete every record in a terminal state, returning the count
    pub async fn clear_history(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM downloads WHERE status IN (?, ?, ?)")
            .bind(Status::Completed.to_i32())
            .bind(Status::Error.to_i32())
            .bind(Status::Cancelled.to_i32())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to clear history: {}",
                    e
                )))
            })?;

        Ok(result.rows_affected())
    }

    /// Backdate a record's creation time (test support for retention logic)
    #[cfg(test)]
    pub(crate) async fn set_created_at(&self, id: DownloadId, created_at: i64) -> Result<()> {
        sqlx::query("UPDATE downloads SET created_at = ? WHERE id = ?")
            .bind(created_at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to set created_at: {}",
                    e
                )))
            })?;

        Ok(())
    }
}
