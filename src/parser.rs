//! yt-dlp output parsing
//!
//! String-pattern scraping of subprocess output is the only progress channel
//! the external tool offers. This module keeps all of that scraping behind a
//! structured-event interface so the orchestrator's state machine can be
//! exercised with synthetic event streams that never touch a real process.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Matches progress lines produced by `--progress-template download:%(progress)s`
#[allow(clippy::expect_used)]
static PROGRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"download:\s*(\d+(?:\.\d+)?)%").expect("valid progress pattern"));

/// Matches the destination announcement yt-dlp prints before writing output
#[allow(clippy::expect_used)]
static DESTINATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[download\] Destination: (.+)").expect("valid destination pattern"));

/// Structured signal extracted from a line of yt-dlp output
#[derive(Clone, Debug, PartialEq)]
pub enum OutputEvent {
    /// Progress percentage, clamped to [0.0, 100.0]
    Progress(f32),

    /// Path the tool announced it is writing to
    Destination(String),
}

/// Incremental line-oriented parser for streamed yt-dlp output
///
/// Subprocess pipes deliver arbitrary chunks, so lines may arrive split
/// across reads. The parser buffers until a line boundary and only then
/// attempts extraction. Unmatched lines are diagnostic noise and are
/// silently ignored.
#[derive(Debug, Default)]
pub struct LineParser {
    buffer: String,
}

impl LineParser {
    /// Create an empty parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of output, returning events for every completed line
    pub fn push_chunk(&mut self, chunk: &str) -> Vec<OutputEvent> {
        self.buffer.push_str(chunk);

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            if let Some(event) = parse_line(line.trim_end_matches(['\n', '\r'])) {
                events.push(event);
            }
        }
        events
    }

    /// Consume any buffered trailing data that never received a newline
    pub fn finish(&mut self) -> Option<OutputEvent> {
        let rest = std::mem::take(&mut self.buffer);
        parse_line(rest.trim_end_matches(['\n', '\r']))
    }
}

/// Extract a structured event from one complete line, if it matches
pub fn parse_line(line: &str) -> Option<OutputEvent> {
    if let Some(caps) = PROGRESS_RE.captures(line) {
        if let Ok(percent) = caps[1].parse::<f32>() {
            return Some(OutputEvent::Progress(percent.clamp(0.0, 100.0)));
        }
    }

    if let Some(caps) = DESTINATION_RE.captures(line) {
        return Some(OutputEvent::Destination(caps[1].trim().to_string()));
    }

    None
}

/// Parse the single JSON document emitted by `--dump-json`
pub fn parse_info_json(output: &str) -> Result<serde_json::Value> {
    serde_json::from_str(output.trim())
        .map_err(|e| Error::Probe(format!("unparseable JSON from yt-dlp: {}", e)))
}

/// Extract the version string from `--version` output
pub fn parse_version(output: &str) -> String {
    output.trim().to_string()
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    // --- Single-line extraction ---

    #[test]
    fn progress_line_with_decimal_is_extracted() {
        assert_eq!(
            parse_line("download: 45.0%"),
            Some(OutputEvent::Progress(45.0))
        );
    }

    #[test]
    fn progress_line_without_space_is_extracted() {
        assert_eq!(
            parse_line("download:45.0%"),
            Some(OutputEvent::Progress(45.0))
        );
    }

    #[test]
    fn progress_line_with_integer_percent_is_extracted() {
        assert_eq!(parse_line("download:100%"), Some(OutputEvent::Progress(100.0)));
    }

    #[test]
    fn progress_line_with_trailing_stats_is_extracted() {
        // Real template output carries speed/ETA after the percentage
        assert_eq!(
            parse_line("download:  12.3% of 10.00MiB at 1.25MiB/s ETA 00:07"),
            Some(OutputEvent::Progress(12.3))
        );
    }

    #[test]
    fn progress_over_100_is_clamped() {
        assert_eq!(
            parse_line("download:120.5%"),
            Some(OutputEvent::Progress(100.0))
        );
    }

    #[test]
    fn destination_line_is_extracted() {
        assert_eq!(
            parse_line("[download] Destination: downloads/42.mp4"),
            Some(OutputEvent::Destination("downloads/42.mp4".to_string()))
        );
    }

    #[test]
    fn destination_with_spaces_in_path_is_preserved() {
        assert_eq!(
            parse_line("[download] Destination: downloads/My Video 42.webm"),
            Some(OutputEvent::Destination(
                "downloads/My Video 42.webm".to_string()
            ))
        );
    }

    #[test]
    fn unrelated_diagnostic_lines_are_ignored() {
        assert_eq!(parse_line("[youtube] abc123: Downloading webpage"), None);
        assert_eq!(parse_line("[info] Testing format 137"), None);
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("download: not-a-number%"), None);
    }

    // --- Chunked stream handling ---

    #[test]
    fn chunk_split_mid_line_is_buffered_until_newline() {
        let mut parser = LineParser::new();

        assert!(parser.push_chunk("downlo").is_empty());
        assert!(parser.push_chunk("ad:45.0").is_empty());

        let events = parser.push_chunk("%\n");
        assert_eq!(events, vec![OutputEvent::Progress(45.0)]);
    }

    #[test]
    fn one_chunk_can_carry_multiple_lines() {
        let mut parser = LineParser::new();

        let events = parser.push_chunk(
            "[download] Destination: downloads/7.mp4\ndownload:10.0%\ndownload:20.0%\n",
        );

        assert_eq!(
            events,
            vec![
                OutputEvent::Destination("downloads/7.mp4".to_string()),
                OutputEvent::Progress(10.0),
                OutputEvent::Progress(20.0),
            ]
        );
    }

    #[test]
    fn interleaved_noise_lines_do_not_break_the_stream() {
        let mut parser = LineParser::new();

        let events = parser.push_chunk(
            "[youtube] Extracting URL\ndownload:50.0%\nWARNING: something harmless\ndownload:60.0%\n",
        );

        assert_eq!(
            events,
            vec![OutputEvent::Progress(50.0), OutputEvent::Progress(60.0)]
        );
    }

    #[test]
    fn carriage_returns_are_stripped_before_matching() {
        let mut parser = LineParser::new();
        let events = parser.push_chunk("download:33.3%\r\n");
        assert_eq!(events, vec![OutputEvent::Progress(33.3)]);
    }

    #[test]
    fn finish_flushes_a_trailing_line_without_newline() {
        let mut parser = LineParser::new();
        assert!(parser.push_chunk("download:99.9%").is_empty());
        assert_eq!(parser.finish(), Some(OutputEvent::Progress(99.9)));
        // Buffer is consumed
        assert_eq!(parser.finish(), None);
    }

    // --- Probe JSON ---

    #[test]
    fn valid_probe_json_parses() {
        let value = parse_info_json(r#"{"title": "A Video", "duration": 63}"#).unwrap();
        assert_eq!(value["title"], "A Video");
        assert_eq!(value["duration"], 63);
    }

    #[test]
    fn probe_json_tolerates_surrounding_whitespace() {
        let value = parse_info_json("\n  {\"title\": \"T\"}\n").unwrap();
        assert_eq!(value["title"], "T");
    }

    #[test]
    fn invalid_probe_json_is_a_probe_error() {
        let err = parse_info_json("ERROR: unsupported URL").unwrap_err();
        match err {
            Error::Probe(msg) => assert!(msg.contains("unparseable JSON")),
            other => panic!("expected Probe error, got {other:?}"),
        }
    }

    #[test]
    fn version_output_is_trimmed() {
        assert_eq!(parse_version("2025.01.15\n"), "2025.01.15");
    }
}
