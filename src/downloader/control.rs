//! Download lifecycle control — cancellation, deletion, history clearing.

use crate::error::{DownloadError, Error, Result};
use crate::types::{DownloadId, Event, Status};

use super::MediaDownloader;

impl MediaDownloader {
    /// Cancel a running download
    ///
    /// Atomically removes the download's cancellation token from the job
    /// registry; if one was present, signals it so the supervising task
    /// kills the process. The terminal `Cancelled` transition is performed
    /// by that task, never here: the process's own termination handler is
    /// the sole writer of terminal state, so cancellation can never race a
    /// completion into a double transition.
    ///
    /// Cancelling a download with no live process (already finished, never
    /// existed) is a no-op, not an error.
    ///
    /// # Returns
    ///
    /// `true` if a live process was signalled, `false` if there was
    /// nothing to cancel.
    pub async fn cancel_download(&self, id: DownloadId) -> Result<bool> {
        match self.registry.remove(id).await {
            Some(token) => {
                token.cancel();
                tracing::info!(download_id = id.0, "Cancellation requested");
                self.emit_event(Event::QueueUpdated {});
                Ok(true)
            }
            None => {
                tracing::warn!(
                    download_id = id.0,
                    "Cancel requested but no active process found"
                );
                Ok(false)
            }
        }
    }

    /// Delete a download's artifact and record
    ///
    /// The file is removed first, tolerating "already absent" and logging
    /// any other failure; the record is deleted regardless, so metadata
    /// cannot accumulate behind undeletable files.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::NotFound`] if no record exists for the id.
    pub async fn delete_download(&self, id: DownloadId) -> Result<()> {
        let download = self
            .db
            .get_download(id)
            .await?
            .ok_or(Error::Download(DownloadError::NotFound { id: id.0 }))?;

        if let Some(ref relative) = download.file_path {
            match crate::utils::resolve_under_root(self.config.download_dir(), relative) {
                Some(absolute) => match tokio::fs::remove_file(&absolute).await {
                    Ok(()) => {
                        tracing::info!(download_id = id.0, path = %absolute.display(), "Deleted artifact");
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        tracing::warn!(
                            download_id = id.0,
                            path = %absolute.display(),
                            "Artifact already absent, deleting record only"
                        );
                    }
                    Err(e) => {
                        tracing::error!(
                            download_id = id.0,
                            path = %absolute.display(),
                            error = %e,
                            "Failed to delete artifact, deleting record anyway"
                        );
                    }
                },
                None => {
                    tracing::warn!(
                        download_id = id.0,
                        path = %relative,
                        "Stored path escapes the output root, deleting record only"
                    );
                }
            }
        }

        self.db.delete_download(id).await?;
        tracing::info!(download_id = id.0, "Deleted download record");
        self.emit_event(Event::QueueUpdated {});

        Ok(())
    }

    /// Delete every record in a terminal state
    ///
    /// Files are not touched: history clearing is a metadata operation, the
    /// retention sweeper owns artifact reclamation.
    ///
    /// # Returns
    ///
    /// The number of records removed.
    pub async fn clear_history(&self) -> Result<u64> {
        let removed = self.db.clear_history().await?;
        tracing::info!(removed, "Cleared history");
        self.emit_event(Event::HistoryUpdated {});
        Ok(removed)
    }

    /// Resolve a completed download's artifact path for serving
    ///
    /// # Errors
    ///
    /// - [`DownloadError::NotFound`] if no record exists
    /// - [`DownloadError::InvalidState`] if the download is not Completed
    ///   or has no stored path
    /// - [`DownloadError::FileNotFound`] if the artifact is gone from disk
    ///   or its stored path escapes the output root
    pub async fn artifact_path(&self, id: DownloadId) -> Result<std::path::PathBuf> {
        let download = self
            .db
            .get_download(id)
            .await?
            .ok_or(Error::Download(DownloadError::NotFound { id: id.0 }))?;

        let status = Status::from_i32(download.status);
        let Some(relative) = download.file_path.filter(|_| status == Status::Completed) else {
            return Err(Error::Download(DownloadError::InvalidState {
                id: id.0,
                operation: "serve".to_string(),
                current_state: format!("{:?}", status).to_lowercase(),
            }));
        };

        let absolute = crate::utils::resolve_under_root(self.config.download_dir(), &relative)
            .ok_or_else(|| {
                Error::Download(DownloadError::FileNotFound {
                    id: id.0,
                    path: relative.clone(),
                })
            })?;

        if !tokio::fs::try_exists(&absolute).await.unwrap_or(false) {
            return Err(Error::Download(DownloadError::FileNotFound {
                id: id.0,
                path: relative,
            }));
        }

        Ok(absolute)
    }
}
