//! Retention sweeping for completed download artifacts
//!
//! This module provides the background task that reclaims disk space:
//! completed downloads older than the configured retention window have
//! their artifact deleted and their record removed.
//!
//! # Behavior
//!
//! - Only Completed records with a stored artifact path are targeted;
//!   Error and Cancelled history is kept until the user clears it
//! - "File already absent" counts as success
//! - The record is deleted even when file deletion fails, so metadata
//!   growth stays bounded
//! - Graceful shutdown handling via the downloader's accepting-new flag
//!
//! # Example
//!
//! ```no_run
//! use media_dl::{MediaDownloader, Config};
//! use media_dl::retention::RetentionSweeper;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let downloader = Arc::new(MediaDownloader::new(config).await?);
//!
//! let sweeper = RetentionSweeper::new(downloader.clone());
//!
//! // Run sweeper task (loops until shutdown)
//! tokio::spawn(async move {
//!     sweeper.run().await;
//! });
//! # Ok(())
//! # }
//! ```

use crate::MediaDownloader;
use crate::types::DownloadId;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Periodic task that reclaims old completed downloads
pub struct RetentionSweeper {
    /// Reference to the downloader for record access and shutdown status
    downloader: Arc<MediaDownloader>,
}

impl RetentionSweeper {
    /// Creates a new retention sweeper
    pub fn new(downloader: Arc<MediaDownloader>) -> Self {
        Self { downloader }
    }

    /// Starts the sweeper task
    ///
    /// Runs a sweep on the configured period (hourly by default) until the
    /// downloader stops accepting new downloads. Sweep failures are logged
    /// and do not stop the task: nobody can act on them, and the next
    /// period retries naturally.
    pub async fn run(self) {
        let interval = self.downloader.get_config().sweep_interval();
        info!(interval_secs = interval.as_secs(), "Retention sweeper started");

        loop {
            if !self.downloader.accepting_new.load(Ordering::SeqCst) {
                info!("Retention sweeper shutting down");
                break;
            }

            match self.sweep_once().await {
                Ok(0) => debug!("Retention sweep found nothing to reclaim"),
                Ok(swept) => info!(swept, "Retention sweep reclaimed old downloads"),
                Err(e) => warn!(error = %e, "Retention sweep failed"),
            }

            sleep(interval).await;
        }

        info!("Retention sweeper stopped");
    }

    /// Perform a single sweep, returning how many downloads were reclaimed
    ///
    /// Separated from [`run`](RetentionSweeper::run) so the reclamation
    /// logic is testable without the timing loop.
    pub async fn sweep_once(&self) -> crate::Result<usize> {
        let config = self.downloader.get_config();
        let cutoff = chrono::Utc::now().timestamp()
            - i64::try_from(config.retention_window().as_secs()).unwrap_or(i64::MAX);

        let candidates = self.downloader.db.list_retention_candidates(cutoff).await?;
        if candidates.is_empty() {
            return Ok(0);
        }

        let mut swept = 0;
        for download in candidates {
            let id = DownloadId(download.id);

            if let Some(ref relative) = download.file_path {
                match crate::utils::resolve_under_root(config.download_dir(), relative) {
                    Some(absolute) => match tokio::fs::remove_file(&absolute).await {
                        Ok(()) => {
                            info!(download_id = id.0, path = %absolute.display(), "Deleted expired artifact");
                        }
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                            warn!(
                                download_id = id.0,
                                path = %absolute.display(),
                                "Expired artifact already absent"
                            );
                        }
                        Err(e) => {
                            warn!(
                                download_id = id.0,
                                path = %absolute.display(),
                                error = %e,
                                "Failed to delete expired artifact, removing record anyway"
                            );
                        }
                    },
                    None => {
                        warn!(
                            download_id = id.0,
                            path = %relative,
                            "Stored path escapes the output root, removing record only"
                        );
                    }
                }
            }

            // Record deletion proceeds regardless of file deletion outcome
            match self.downloader.db.delete_download(id).await {
                Ok(()) => {
                    debug!(download_id = id.0, "Deleted expired download record");
                    swept += 1;
                }
                Err(e) => {
                    warn!(download_id = id.0, error = %e, "Failed to delete expired record");
                }
            }
        }

        Ok(swept)
    }
}
