//! Download spawning and per-process supervision.
//!
//! `start_download` blocks its caller only for record creation and process
//! spawn; everything after that happens in a spawned supervision task, one
//! per download, running independently of every other download's.
//!
//! The supervision task is the sole writer of terminal state. Cancellation
//! only ever cancels the token registered for the process; the resulting
//! kill surfaces here as termination-without-exit-code, which is the single
//! signal for "cancelled" regardless of who initiated it.

use crate::error::{Error, Result};
use crate::parser::{LineParser, OutputEvent};
use crate::runner::{ProcessHandle, ProcessOutcome};
use crate::types::{DownloadId, DownloadItem, DownloadRequest, Event, Status};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

use super::MediaDownloader;

impl MediaDownloader {
    /// Start a new download
    ///
    /// Validates the request, creates a Pending record, spawns yt-dlp,
    /// registers the process in the job registry, transitions the record to
    /// Downloading, and returns the download to the caller immediately.
    /// All further progress is asynchronous.
    ///
    /// If the process cannot be spawned at all, the record transitions
    /// straight to Error without ever reaching Downloading, and is returned
    /// in that state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when a required field is missing or
    /// the URL does not parse; no record is created in that case. Returns
    /// [`Error::ShuttingDown`] once shutdown has been initiated.
    pub async fn start_download(&self, request: DownloadRequest) -> Result<DownloadItem> {
        validate_request(&request)?;

        if !self
            .accepting_new
            .load(std::sync::atomic::Ordering::SeqCst)
        {
            return Err(Error::ShuttingDown);
        }

        // 1. Create the record in Pending state
        let id = self
            .db
            .insert_download(&crate::db::NewDownload {
                url: request.url.clone(),
                title: request.title.clone(),
                thumbnail: request.thumbnail.clone(),
                format_id: request.format.id.clone(),
                format_label: request.format.label.clone(),
            })
            .await?;

        tracing::info!(
            download_id = id.0,
            url = %request.url,
            format = %request.format.id,
            "Starting download"
        );

        // 2. Spawn the external process
        let args = self.build_download_args(id, &request);
        let mut handle = match self.runner.spawn(&args) {
            Ok(handle) => handle,
            Err(spawn_err) => {
                // Spawn failure: straight to Error, never Downloading
                let message = format!("Failed to spawn yt-dlp: {}", spawn_err);
                self.db.mark_error(id, &message).await?;
                tracing::error!(download_id = id.0, error = %message, "Spawn failed");
                self.emit_event(Event::Error {
                    id,
                    error: message,
                });
                self.emit_event(Event::QueueUpdated {});
                return self.fetch_item(id).await;
            }
        };

        // 3. Register the process, then mark Downloading
        let token = CancellationToken::new();
        self.registry.register(id, token.clone()).await;
        if let Err(e) = self.db.update_status(id, Status::Downloading).await {
            // The handle drops on return and kill_on_drop reaps the process;
            // the registry entry must not outlive it
            self.registry.remove(id).await;
            return Err(e);
        }

        // 4. Supervise asynchronously; the caller gets the record back now
        let supervisor = self.clone();
        let stdout = handle.take_stdout();
        let stderr = handle.take_stderr();
        tokio::spawn(async move {
            supervisor
                .supervise(id, handle, stdout, stderr, token)
                .await;
        });

        self.fetch_item(id).await
    }

    /// Construct the yt-dlp argument vector for a download
    ///
    /// The output template is parameterized by the download id, so
    /// concurrently running downloads with identical titles can never
    /// collide on a destination path.
    fn build_download_args(&self, id: DownloadId, request: &DownloadRequest) -> Vec<String> {
        let output_template = self
            .config
            .download_dir()
            .join(format!("{}.%(ext)s", id));

        let mut args = vec![
            request.url.clone(),
            "-f".to_string(),
            request.format.id.clone(),
            "-o".to_string(),
            output_template.to_string_lossy().into_owned(),
            "--progress".to_string(),
            "--progress-template".to_string(),
            "download:%(progress)s".to_string(),
            "--newline".to_string(),
            "--no-warnings".to_string(),
            "--no-playlist".to_string(),
            "--restrict-filenames".to_string(),
        ];

        let cookies = &self.config.tools.cookies_file;
        if cookies.exists() {
            args.push("--cookies".to_string());
            args.push(cookies.to_string_lossy().into_owned());
        }

        args
    }

    /// Drive one process to termination and resolve its record
    async fn supervise(
        &self,
        id: DownloadId,
        mut handle: ProcessHandle,
        stdout: Option<tokio::process::ChildStdout>,
        stderr: Option<tokio::process::ChildStderr>,
        token: CancellationToken,
    ) {
        // Stderr drains concurrently, purely for diagnostic accumulation
        let stderr_task = tokio::spawn(async move {
            let mut buffer = String::new();
            if let Some(mut stderr) = stderr {
                stderr.read_to_string(&mut buffer).await.ok();
            }
            buffer
        });

        // Stdout drains through the parser in this task, so record updates
        // for this download are applied in the order events are observed
        let mut destination: Option<String> = None;
        let mut killed = false;

        if let Some(mut stdout) = stdout {
            let mut parser = LineParser::new();
            let mut last_progress: i64 = 0;
            let mut chunk = [0u8; 4096];

            loop {
                tokio::select! {
                    read = stdout.read(&mut chunk) => {
                        match read {
                            Ok(0) | Err(_) => break,
                            Ok(n) => {
                                let text = String::from_utf8_lossy(&chunk[..n]);
                                for event in parser.push_chunk(&text) {
                                    self.apply_output_event(id, event, &mut last_progress, &mut destination)
                                        .await;
                                }
                            }
                        }
                    }
                    _ = token.cancelled(), if !killed => {
                        handle.start_kill().ok();
                        killed = true;
                        // Stop draining: a surviving grandchild (ffmpeg) may
                        // hold the pipe open long after the kill
                        break;
                    }
                }
            }

            if let Some(event) = parser.finish() {
                self.apply_output_event(id, event, &mut last_progress, &mut destination)
                    .await;
            }
        }

        // Stdout is closed; wait for the exit status, still honoring a
        // cancellation that lands in the gap before the process dies
        let outcome = loop {
            tokio::select! {
                result = handle.wait() => break result,
                _ = token.cancelled(), if !killed => {
                    handle.start_kill().ok();
                    killed = true;
                }
            }
        };

        // The registry entry never outlives the process. Remove is
        // idempotent: a concurrent cancel may already have taken it.
        self.registry.remove(id).await;

        let stderr_output = stderr_task.await.unwrap_or_default();

        match outcome {
            Ok(ProcessOutcome::Exited(0)) => self.resolve_completed(id, destination).await,
            Ok(ProcessOutcome::Terminated) => self.resolve_cancelled(id).await,
            Ok(ProcessOutcome::Exited(code)) => {
                self.resolve_error(id, exit_error_message(code, &stderr_output))
                    .await
            }
            Err(e) => {
                self.resolve_error(id, format!("Failed to reap yt-dlp process: {}", e))
                    .await
            }
        }
    }

    /// Apply one parsed output event to the record and the broadcast
    async fn apply_output_event(
        &self,
        id: DownloadId,
        event: OutputEvent,
        last_progress: &mut i64,
        destination: &mut Option<String>,
    ) {
        match event {
            OutputEvent::Progress(percent) => {
                let floor = percent as i64;
                // yt-dlp restarts its counter per stream (video, then audio);
                // the persisted value must never regress
                if floor < *last_progress {
                    return;
                }
                *last_progress = floor;

                if let Err(e) = self.db.update_progress(id, floor).await {
                    tracing::warn!(download_id = id.0, error = %e, "Failed to persist progress");
                }
                self.emit_event(Event::Progress {
                    id,
                    progress: percent,
                });
            }
            OutputEvent::Destination(path) => {
                // Remembered only; not persisted until the terminal state,
                // so a half-written file is never exposed
                *destination = Some(path);
            }
        }
    }

    /// Resolve a zero-exit process as Completed
    async fn resolve_completed(&self, id: DownloadId, destination: Option<String>) {
        let relative = destination
            .as_deref()
            .and_then(|dest| relativize_destination(dest, self.config.download_dir()));

        if destination.is_some() && relative.is_none() {
            tracing::warn!(
                download_id = id.0,
                "Destination escapes the output root, not persisting it"
            );
        }

        if let Err(e) = self.db.mark_completed(id, relative.as_deref()).await {
            tracing::error!(download_id = id.0, error = %e, "Failed to persist completion");
            return;
        }

        tracing::info!(download_id = id.0, file = ?relative, "Download completed");
        self.emit_event(Event::Complete { id });
        self.emit_event(Event::QueueUpdated {});
    }

    /// Resolve a killed process as Cancelled
    async fn resolve_cancelled(&self, id: DownloadId) {
        if let Err(e) = self.db.mark_cancelled(id).await {
            tracing::error!(download_id = id.0, error = %e, "Failed to persist cancellation");
            return;
        }

        tracing::warn!(download_id = id.0, "Download cancelled");
        self.emit_event(Event::Cancelled { id });
        self.emit_event(Event::QueueUpdated {});
    }

    /// Resolve a failed process as Error
    async fn resolve_error(&self, id: DownloadId, message: String) {
        if let Err(e) = self.db.mark_error(id, &message).await {
            tracing::error!(download_id = id.0, error = %e, "Failed to persist error state");
            return;
        }

        tracing::error!(download_id = id.0, error = %message, "Download failed");
        self.emit_event(Event::Error { id, error: message });
        self.emit_event(Event::QueueUpdated {});
    }

    /// Fetch the current record as a DownloadItem
    async fn fetch_item(&self, id: DownloadId) -> Result<DownloadItem> {
        self.db
            .get_download(id)
            .await?
            .map(DownloadItem::from)
            .ok_or_else(|| {
                Error::Download(crate::error::DownloadError::NotFound { id: id.0 })
            })
    }
}

/// Validate that every mandatory request field is present and usable
fn validate_request(request: &DownloadRequest) -> Result<()> {
    if request.url.trim().is_empty() {
        return Err(Error::InvalidInput("url is required".to_string()));
    }
    if url::Url::parse(&request.url).is_err() {
        return Err(Error::InvalidInput(format!(
            "not a valid URL: {}",
            request.url
        )));
    }
    if request.format.id.trim().is_empty() {
        return Err(Error::InvalidInput("format is required".to_string()));
    }
    if request.title.trim().is_empty() {
        return Err(Error::InvalidInput("title is required".to_string()));
    }
    if request.thumbnail.trim().is_empty() {
        return Err(Error::InvalidInput("thumbnail is required".to_string()));
    }
    Ok(())
}

/// Build the persisted error message for a nonzero exit
fn exit_error_message(code: i32, stderr: &str) -> String {
    let diagnostics = stderr.trim();
    format!(
        "yt-dlp exited with code {}. Error: {}",
        code,
        if diagnostics.is_empty() {
            "No stderr output."
        } else {
            diagnostics
        }
    )
}

/// Make an announced destination relative to the output root
///
/// The tool echoes the `-o` template back with the extension filled in,
/// usually as `<root>/<id>.<ext>`. Anything that cannot be expressed as a
/// non-escaping path under the root is discarded rather than persisted.
fn relativize_destination(dest: &str, root: &Path) -> Option<String> {
    let dest = Path::new(dest.trim());

    // Strip the root prefix, tolerating a "./" spelling of the root
    let trimmed_root = root
        .to_str()
        .map(|r| r.trim_start_matches("./"))
        .filter(|r| !r.is_empty())
        .map(Path::new);

    let relative = if let Ok(rel) = dest.strip_prefix(root) {
        rel.to_path_buf()
    } else if let Some(trimmed) = trimmed_root
        && let Ok(rel) = dest.strip_prefix(trimmed)
    {
        rel.to_path_buf()
    } else if dest.is_relative() {
        dest.to_path_buf()
    } else {
        return None;
    };

    // Never persist a path that would resolve outside the root
    crate::utils::resolve_under_root(root, &relative)?;

    Some(relative.to_string_lossy().into_owned())
}
