//! Database layer for media-dl
//!
//! Handles SQLite persistence for downloads and argument templates.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] — Database lifecycle, schema migrations
//! - [`downloads`] — Download record CRUD and state transitions
//! - [`templates`] — Argument template CRUD

use crate::types::{DownloadItem, RequestedFormat, Status};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, sqlite::SqlitePool};
use utoipa::ToSchema;

mod downloads;
mod migrations;
mod templates;

/// New download to be inserted into the database
///
/// Status, progress, and timestamps are set by the insert itself: every
/// record starts Pending at 0% with a fresh `created_at`.
#[derive(Debug, Clone)]
pub struct NewDownload {
    /// Source page or media URL
    pub url: String,
    /// Display title
    pub title: String,
    /// Thumbnail URL
    pub thumbnail: String,
    /// yt-dlp format selector
    pub format_id: String,
    /// Human-readable format label
    pub format_label: String,
}

/// Download record from database
#[derive(Debug, Clone, FromRow)]
pub struct Download {
    /// Unique database ID
    pub id: i64,
    /// Source page or media URL
    pub url: String,
    /// Display title
    pub title: String,
    /// Thumbnail URL
    pub thumbnail: String,
    /// yt-dlp format selector
    pub format_id: String,
    /// Human-readable format label
    pub format_label: String,
    /// Current status (see [`Status`] integer coding)
    pub status: i32,
    /// Progress percentage, 0 to 100
    pub progress: i64,
    /// Artifact path relative to the output root (Completed only)
    pub file_path: Option<String>,
    /// Error message (Error only)
    pub error_message: Option<String>,
    /// Unix timestamp when the download was created
    pub created_at: i64,
}

impl From<Download> for DownloadItem {
    fn from(row: Download) -> Self {
        use chrono::{TimeZone, Utc};

        DownloadItem {
            id: crate::types::DownloadId(row.id),
            url: row.url,
            title: row.title,
            thumbnail: row.thumbnail,
            status: Status::from_i32(row.status),
            progress: row.progress,
            format: RequestedFormat {
                id: row.format_id,
                label: row.format_label,
            },
            file_path: row.file_path,
            error: row.error_message,
            created_at: Utc
                .timestamp_opt(row.created_at, 0)
                .single()
                .unwrap_or_else(Utc::now),
        }
    }
}

/// New argument template to be inserted into the database
#[derive(Debug, Clone)]
pub struct NewArgumentTemplate {
    /// Display name
    pub name: String,
    /// The argument string the template expands to
    pub args: String,
}

/// Named, reusable argument-string preset
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct ArgumentTemplate {
    /// Unique database ID
    pub id: i64,
    /// Display name
    pub name: String,
    /// The argument string the template expands to
    pub args: String,
    /// Unix timestamp when the template was created
    pub created_at: i64,
}

/// Database handle for media-dl
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
