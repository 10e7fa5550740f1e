//! Core downloader implementation split into focused submodules.
//!
//! The `MediaDownloader` struct and its methods are organized by domain:
//! - [`start`] - Download spawning and per-process supervision
//! - [`control`] - Cancellation, deletion, history clearing
//! - [`probe`] - Metadata probing and tool version queries

mod control;
mod probe;
mod start;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::registry::JobRegistry;
use crate::runner::YtDlp;
use crate::types::{DownloadId, DownloadItem, Event};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
///
/// Owns the record store, the event broadcast channel, the yt-dlp runner,
/// and the registry of live processes. Every per-download supervision task
/// holds a clone.
#[derive(Clone)]
pub struct MediaDownloader {
    /// Database instance for persistence (wrapped in Arc for sharing across tasks)
    /// Public for integration tests to query download state
    pub db: Arc<Database>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Handle to the yt-dlp binary
    pub(crate) runner: Arc<YtDlp>,
    /// Registry of live download processes
    pub(crate) registry: JobRegistry,
    /// Flag to indicate whether new downloads are accepted (cleared during shutdown)
    pub(crate) accepting_new: Arc<AtomicBool>,
}

impl MediaDownloader {
    /// Create a new MediaDownloader instance
    ///
    /// This initializes all core components:
    /// - Ensures the output root directory exists
    /// - Opens/creates the SQLite database and runs migrations
    /// - Locates the yt-dlp binary (explicit path or PATH discovery)
    /// - Sets up the event broadcast channel and an empty job registry
    pub async fn new(config: Config) -> Result<Self> {
        Self::with_registry(config, JobRegistry::new()).await
    }

    /// Create a MediaDownloader with an injected job registry
    ///
    /// The registry is an explicit dependency so its lifetime and
    /// concurrent-access discipline can be exercised in isolation.
    pub async fn with_registry(config: Config, registry: JobRegistry) -> Result<Self> {
        // Ensure the output root exists
        tokio::fs::create_dir_all(config.download_dir())
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create download directory '{}': {}",
                        config.download_dir().display(),
                        e
                    ),
                ))
            })?;

        // Initialize database
        let db = Database::new(&config.persistence.database_path).await?;

        // Create broadcast channel with buffer size of 1000 events
        // This allows multiple subscribers to receive all events independently
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        // Locate the yt-dlp binary
        let runner = if let Some(ref path) = config.tools.ytdlp_path {
            YtDlp::new(path.clone())
        } else if config.tools.search_path {
            YtDlp::from_path().ok_or_else(|| {
                Error::ExternalTool("yt-dlp not found in PATH".to_string())
            })?
        } else {
            return Err(Error::Config {
                message: "no yt-dlp path configured and PATH search disabled".to_string(),
                key: Some("ytdlp_path".to_string()),
            });
        };

        tracing::info!(
            binary = %runner.binary_path().display(),
            download_dir = %config.download_dir().display(),
            "Downloader initialized"
        );

        Ok(Self {
            db: Arc::new(db),
            event_tx,
            config: Arc::new(config),
            runner: Arc::new(runner),
            registry,
            accepting_new: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Subscribe to download events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    /// Events are buffered, but if a subscriber falls behind by more than 1000 events,
    /// it will receive a `RecvError::Lagged` error. Delivery is best-effort: an observer
    /// connecting after an event fires simply misses it and must reconcile via a full
    /// re-fetch.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use media_dl::{MediaDownloader, Config};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = MediaDownloader::new(Config::default()).await?;
    ///
    ///     let mut events = downloader.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             println!("Event: {:?}", event);
    ///         }
    ///     });
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Access the registry of live download processes
    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// List all downloads, newest first
    pub async fn list_downloads(&self) -> Result<Vec<DownloadItem>> {
        let rows = self.db.list_downloads().await?;
        Ok(rows.into_iter().map(DownloadItem::from).collect())
    }

    /// Get a single download by id
    pub async fn get_download(&self, id: DownloadId) -> Result<Option<DownloadItem>> {
        Ok(self.db.get_download(id).await?.map(DownloadItem::from))
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers, the event is silently dropped (ok() converts
    /// Err to None). Downloads proceed whether or not anyone is listening.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Stop accepting new downloads and terminate all live processes
    ///
    /// Each terminated process resolves through its own supervision task,
    /// so affected downloads end up Cancelled via the normal path.
    pub async fn shutdown(&self) -> Result<()> {
        self.accepting_new
            .store(false, std::sync::atomic::Ordering::SeqCst);

        let cancelled = self.registry.drain().await;
        for token in &cancelled {
            token.cancel();
        }

        tracing::info!(
            live_processes = cancelled.len(),
            "Shutdown initiated, live processes signalled"
        );

        Ok(())
    }

    /// Spawn the REST API server in a background task
    ///
    /// The server runs concurrently with download supervision and listens on the
    /// configured bind address.
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let downloader = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(downloader, config).await })
    }
}
