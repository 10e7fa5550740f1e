//! Core types for media-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for a download
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct DownloadId(pub i64);

impl DownloadId {
    /// Create a new DownloadId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for DownloadId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<DownloadId> for i64 {
    fn from(id: DownloadId) -> Self {
        id.0
    }
}

impl std::fmt::Display for DownloadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DownloadId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

// Implement sqlx Type, Encode, and Decode for database operations
impl sqlx::Type<sqlx::Sqlite> for DownloadId {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for DownloadId {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::Encode::<sqlx::Sqlite>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for DownloadId {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let id = <i64 as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self(id))
    }
}

/// Download status
///
/// `Paused` is reserved for a future pause/resume feature; no code path
/// currently produces it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Record created, process not yet spawned
    Pending,
    /// Process running
    Downloading,
    /// Paused (reserved, currently unreachable)
    Paused,
    /// Finished successfully, artifact on disk
    Completed,
    /// Failed to spawn or exited nonzero
    Error,
    /// Process forcibly terminated
    Cancelled,
}

impl Status {
    /// Convert integer status code to Status enum
    pub fn from_i32(status: i32) -> Self {
        match status {
            0 => Status::Pending,
            1 => Status::Downloading,
            2 => Status::Paused,
            3 => Status::Completed,
            4 => Status::Error,
            5 => Status::Cancelled,
            _ => Status::Error, // Default to Error for unknown status
        }
    }

    /// Convert Status enum to integer status code
    pub fn to_i32(&self) -> i32 {
        match self {
            Status::Pending => 0,
            Status::Downloading => 1,
            Status::Paused => 2,
            Status::Completed => 3,
            Status::Error => 4,
            Status::Cancelled => 5,
        }
    }

    /// Whether this status admits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Completed | Status::Error | Status::Cancelled)
    }
}

/// Event emitted during the download lifecycle
///
/// Serialized as `{"type": "...", "payload": {...}}` so observers receive
/// the same wire shape over any transport.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    /// Progress update for a running download
    #[serde(rename = "download:progress")]
    Progress {
        /// Download ID
        id: DownloadId,
        /// Progress percentage (0.0 to 100.0)
        progress: f32,
    },

    /// Download finished successfully
    #[serde(rename = "download:complete")]
    Complete {
        /// Download ID
        id: DownloadId,
    },

    /// Download was cancelled (process terminated without an exit code)
    #[serde(rename = "download:cancelled")]
    Cancelled {
        /// Download ID
        id: DownloadId,
    },

    /// Download failed
    #[serde(rename = "download:error")]
    Error {
        /// Download ID
        id: DownloadId,
        /// Error message
        error: String,
    },

    /// The set of queued/running downloads changed; observers should re-fetch
    #[serde(rename = "queue:updated")]
    QueueUpdated {},

    /// Terminal-state history changed; observers should re-fetch
    #[serde(rename = "history:updated")]
    HistoryUpdated {},
}

/// The format a caller selected when starting a download
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RequestedFormat {
    /// yt-dlp format selector (e.g. "best", "137+140")
    pub id: String,

    /// Human-readable label shown in queue views
    pub label: String,
}

/// Request to start a new download
///
/// All four fields are mandatory; an empty value is an input error and no
/// record is created.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadRequest {
    /// Source page or media URL
    pub url: String,

    /// Requested format
    pub format: RequestedFormat,

    /// Display title
    pub title: String,

    /// Thumbnail URL
    pub thumbnail: String,
}

/// A download as seen by API consumers
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadItem {
    /// Unique download identifier
    pub id: DownloadId,

    /// Source URL
    pub url: String,

    /// Display title
    pub title: String,

    /// Thumbnail URL
    pub thumbnail: String,

    /// Current status
    pub status: Status,

    /// Progress percentage (0 to 100)
    pub progress: i64,

    /// Requested format
    pub format: RequestedFormat,

    /// Artifact path relative to the output root (Completed only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    /// Error message (Error only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the download was created
    pub created_at: DateTime<Utc>,
}

/// One selectable format reported by a metadata probe
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FormatOption {
    /// yt-dlp format identifier
    pub id: String,

    /// Human-readable label
    pub label: String,

    /// File extension the format produces
    pub extension: String,

    /// Approximate size, pre-formatted (e.g. "12.34 MB")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// Metadata about a media URL, produced on demand by a probe
///
/// Ephemeral: never persisted, has no lifecycle beyond the request that
/// produced it.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MediaInfo {
    /// Media title
    pub title: String,

    /// Channel or uploader name
    pub uploader: String,

    /// Duration in seconds
    pub duration: f64,

    /// Thumbnail URL
    pub thumbnail: String,

    /// Formats carrying a video stream
    pub video_formats: Vec<FormatOption>,

    /// Audio-only formats
    pub audio_formats: Vec<FormatOption>,

    /// Everything else, including the tool's default choice
    pub other_formats: Vec<FormatOption>,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    // --- Status integer encoding ---

    #[test]
    fn status_round_trips_through_i32_for_all_variants() {
        let cases = [
            (Status::Pending, 0),
            (Status::Downloading, 1),
            (Status::Paused, 2),
            (Status::Completed, 3),
            (Status::Error, 4),
            (Status::Cancelled, 5),
        ];

        for (variant, expected_int) in cases {
            assert_eq!(
                variant.to_i32(),
                expected_int,
                "{variant:?} should encode to {expected_int}"
            );
            assert_eq!(
                Status::from_i32(expected_int),
                variant,
                "{expected_int} should decode to {variant:?}"
            );
        }
    }

    #[test]
    fn status_from_unknown_integer_defaults_to_error() {
        assert_eq!(
            Status::from_i32(99),
            Status::Error,
            "unknown status 99 must fall back to Error so corrupted DB rows surface visibly"
        );
        assert_eq!(
            Status::from_i32(-1),
            Status::Error,
            "negative status must fall back to Error, not silently become Pending"
        );
    }

    #[test]
    fn terminal_states_are_exactly_completed_error_cancelled() {
        assert!(Status::Completed.is_terminal());
        assert!(Status::Error.is_terminal());
        assert!(Status::Cancelled.is_terminal());
        assert!(!Status::Pending.is_terminal());
        assert!(!Status::Downloading.is_terminal());
        assert!(!Status::Paused.is_terminal());
    }

    // --- DownloadId conversions ---

    #[test]
    fn download_id_from_i64_and_back() {
        let id = DownloadId::from(42_i64);
        let raw: i64 = id.into();
        assert_eq!(raw, 42);
    }

    #[test]
    fn download_id_from_str_parses_valid_integer() {
        let id = DownloadId::from_str("123").unwrap();
        assert_eq!(id.get(), 123);
    }

    #[test]
    fn download_id_from_str_rejects_non_numeric() {
        assert!(DownloadId::from_str("abc").is_err());
        assert!(DownloadId::from_str("").is_err());
        assert!(DownloadId::from_str("3.14").is_err());
    }

    #[test]
    fn download_id_display_matches_inner_value() {
        assert_eq!(DownloadId::new(999).to_string(), "999");
    }

    // --- Event wire format ---

    #[test]
    fn progress_event_serializes_with_wire_type_and_payload() {
        let event = Event::Progress {
            id: DownloadId(7),
            progress: 45.5,
        };
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "download:progress");
        assert_eq!(value["payload"]["id"], 7);
        assert_eq!(value["payload"]["progress"], 45.5);
    }

    #[test]
    fn terminal_events_carry_the_download_id() {
        let complete = serde_json::to_value(Event::Complete { id: DownloadId(1) }).unwrap();
        assert_eq!(complete["type"], "download:complete");
        assert_eq!(complete["payload"]["id"], 1);

        let cancelled = serde_json::to_value(Event::Cancelled { id: DownloadId(2) }).unwrap();
        assert_eq!(cancelled["type"], "download:cancelled");
        assert_eq!(cancelled["payload"]["id"], 2);

        let error = serde_json::to_value(Event::Error {
            id: DownloadId(3),
            error: "boom".into(),
        })
        .unwrap();
        assert_eq!(error["type"], "download:error");
        assert_eq!(error["payload"]["error"], "boom");
    }

    #[test]
    fn broadcast_events_serialize_with_empty_payload() {
        let queue = serde_json::to_value(Event::QueueUpdated {}).unwrap();
        assert_eq!(queue["type"], "queue:updated");
        assert_eq!(queue["payload"], serde_json::json!({}));

        let history = serde_json::to_value(Event::HistoryUpdated {}).unwrap();
        assert_eq!(history["type"], "history:updated");
        assert_eq!(history["payload"], serde_json::json!({}));
    }

    #[test]
    fn event_round_trips_through_json() {
        let original = Event::Error {
            id: DownloadId(12),
            error: "network error".into(),
        };
        let json = serde_json::to_string(&original).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();

        match parsed {
            Event::Error { id, error } => {
                assert_eq!(id, DownloadId(12));
                assert_eq!(error, "network error");
            }
            other => panic!("expected Error event, got {other:?}"),
        }
    }

    #[test]
    fn download_item_omits_absent_optionals_in_json() {
        let item = DownloadItem {
            id: DownloadId(1),
            url: "https://example.com/v".into(),
            title: "T".into(),
            thumbnail: "X".into(),
            status: Status::Downloading,
            progress: 40,
            format: RequestedFormat {
                id: "best".into(),
                label: "Best".into(),
            },
            file_path: None,
            error: None,
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&item).unwrap();
        assert!(value.get("file_path").is_none());
        assert!(value.get("error").is_none());
        assert_eq!(value["status"], "downloading");
    }
}
