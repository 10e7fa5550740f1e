//! Metadata probing — one-shot yt-dlp invocations that never create records.

use crate::error::{Error, Result};
use crate::parser;
use crate::types::{FormatOption, MediaInfo};
use serde_json::Value;

use super::MediaDownloader;

/// Which partition a format is being extracted into
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FormatKind {
    Video,
    Audio,
    Other,
}

impl MediaDownloader {
    /// Probe a URL for metadata and available formats
    ///
    /// One-shot `--dump-json` invocation; nothing is downloaded and no
    /// record is created. Fails with a descriptive error if the tool cannot
    /// be invoked or its output is not parseable JSON.
    pub async fn probe_media_info(&self, url: &str) -> Result<MediaInfo> {
        if url.trim().is_empty() {
            return Err(Error::InvalidInput(
                "url is required to fetch media info".to_string(),
            ));
        }

        let mut args: Vec<&str> = Vec::new();
        let cookies = self.config.tools.cookies_file.to_string_lossy().into_owned();
        if self.config.tools.cookies_file.exists() {
            args.push("--cookies");
            args.push(&cookies);
        }
        args.push("--dump-json");
        args.push(url);

        let stdout = self.runner.run(&args).await.map_err(|e| {
            Error::Probe(format!("could not fetch media info for {}: {}", url, e))
        })?;

        let data = parser::parse_info_json(&stdout)?;
        Ok(media_info_from_json(&data))
    }

    /// Query the yt-dlp version string
    pub async fn tool_version(&self) -> Result<String> {
        let stdout = self.runner.run(&["--version"]).await?;
        Ok(parser::parse_version(&stdout))
    }
}

/// Build a MediaInfo from the probe's JSON document
///
/// The top-level default format (if the probe reports one) is synthesized
/// as an extra entry at the head of "other", labeled with a `[DEFAULT]`
/// prefix that distinguishes it from the regular entries.
pub(crate) fn media_info_from_json(data: &Value) -> MediaInfo {
    let formats = data
        .get("formats")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let mut other_formats = Vec::new();
    if let Some(default) = synthesize_default_format(data) {
        other_formats.push(default);
    }
    other_formats.extend(extract_formats(formats, FormatKind::Other));

    MediaInfo {
        title: string_or(data, "title", "No Title"),
        uploader: string_or(data, "uploader", "Unknown Uploader"),
        duration: data.get("duration").and_then(Value::as_f64).unwrap_or(0.0),
        thumbnail: string_or(data, "thumbnail", ""),
        video_formats: extract_formats(formats, FormatKind::Video),
        audio_formats: extract_formats(formats, FormatKind::Audio),
        other_formats,
    }
}

/// Partition rule:
/// - video: declares a non-"none" video extension
/// - audio: declares a non-"none" audio extension and is not already video
/// - other: neither
fn extract_formats(formats: &[Value], kind: FormatKind) -> Vec<FormatOption> {
    formats
        .iter()
        .filter(|f| {
            let has_video = declares_stream(f, "video_ext");
            let has_audio = declares_stream(f, "audio_ext");
            match kind {
                FormatKind::Video => has_video,
                FormatKind::Audio => has_audio && !has_video,
                FormatKind::Other => !has_video && !has_audio,
            }
        })
        .filter_map(format_option_from_json)
        .collect()
}

/// Whether a format declares a usable stream under the given extension key
fn declares_stream(format: &Value, key: &str) -> bool {
    matches!(
        format.get(key).and_then(Value::as_str),
        Some(ext) if ext != "none"
    )
}

fn format_option_from_json(format: &Value) -> Option<FormatOption> {
    let id = format.get("format_id").and_then(Value::as_str)?.to_string();
    let ext = string_or(format, "ext", "");

    let note = format.get("format_note").and_then(Value::as_str);
    let label = match note {
        // Some extractors report their watermarked fallback this way
        Some("watermarked") if id == "download" => {
            format!("Default (Watermarked) - {}", ext)
        }
        Some(note) => note.to_string(),
        None => format!("{} ({})", ext, id),
    };

    Some(FormatOption {
        id,
        label,
        extension: ext,
        size: format.get("filesize").and_then(Value::as_f64).map(format_size),
    })
}

/// Synthesize the probe's top-level default choice as a format entry
fn synthesize_default_format(data: &Value) -> Option<FormatOption> {
    let id = data.get("format_id").and_then(Value::as_str)?;
    let ext = data.get("ext").and_then(Value::as_str)?;

    let detail = data
        .get("resolution")
        .and_then(Value::as_str)
        .or_else(|| data.get("format_note").and_then(Value::as_str))
        .unwrap_or("");

    Some(FormatOption {
        id: id.to_string(),
        label: format!("[DEFAULT] Default ({}) - {}", ext, detail)
            .trim()
            .trim_end_matches(" -")
            .to_string(),
        extension: ext.to_string(),
        size: data.get("filesize").and_then(Value::as_f64).map(format_size),
    })
}

fn format_size(bytes: f64) -> String {
    format!("{:.2} MB", bytes / (1024.0 * 1024.0))
}

fn string_or(value: &Value, key: &str, default: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}
