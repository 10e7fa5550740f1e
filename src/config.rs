//! Configuration types for media-dl

use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// Download behavior configuration (directories, retention)
///
/// Groups settings related to where artifacts land and how long they are
/// kept. Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Output root directory for produced files (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Age in hours beyond which completed artifacts are reclaimed (default: 5)
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,

    /// Seconds between retention sweeps (default: 3600)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            retention_hours: default_retention_hours(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// External tool configuration (yt-dlp binary, cookies)
///
/// Groups settings for the media-fetch binary. Used as a nested sub-config
/// within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ToolsConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Path where an uploaded cookies file is stored (default: "./cookies.txt")
    ///
    /// The `--cookies` flag is passed to yt-dlp only while a file exists at
    /// this path.
    #[serde(default = "default_cookies_file")]
    pub cookies_file: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
            cookies_file: default_cookies_file(),
        }
    }
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PersistenceConfig {
    /// Path to the SQLite database file (default: "./media-dl.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Bind address for the API server (default: 127.0.0.1:6890)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Whether to enable CORS (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins; "*" allows any (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Whether to serve Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// Main configuration for MediaDownloader
///
/// Fields are organized into logical sub-configs:
/// - [`download`](DownloadConfig) — output directory and retention
/// - [`tools`](ToolsConfig) — yt-dlp binary and cookies
/// - [`api`](ApiConfig) — REST API server
///
/// Sub-config fields are flattened for serialization (no nesting in the
/// JSON/TOML format), except `persistence` which stays grouped.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Download behavior settings
    #[serde(flatten)]
    pub download: DownloadConfig,

    /// External tool settings
    #[serde(flatten)]
    pub tools: ToolsConfig,

    /// Data storage settings
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// REST API settings
    #[serde(flatten)]
    pub api: ApiConfig,
}

// Convenience accessors — allow call sites to use `config.download_dir()` etc.
// without reaching through the sub-config structs.
impl Config {
    /// Output root directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.download.download_dir
    }

    /// Retention window as a Duration
    pub fn retention_window(&self) -> Duration {
        Duration::from_secs(self.download.retention_hours * 3600)
    }

    /// Sweep period as a Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.download.sweep_interval_secs)
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_retention_hours() -> u64 {
    5
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

fn default_cookies_file() -> PathBuf {
    PathBuf::from("./cookies.txt")
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./media-dl.db")
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 6890))
}

fn default_true() -> bool {
    true
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
