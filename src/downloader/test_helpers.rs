//! Shared test helpers for creating MediaDownloader instances in tests.

use crate::config::Config;
use crate::downloader::MediaDownloader;
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};

/// Helper to create a test MediaDownloader backed by a temp directory.
/// Returns the downloader and the tempdir (which must be kept alive).
///
/// The tool path points at `/bin/sh` so construction never depends on a
/// yt-dlp install; tests that actually spawn a process replace it with a
/// scripted stand-in via [`stub_tool`].
pub(crate) async fn create_test_downloader() -> (MediaDownloader, TempDir) {
    let temp_dir = tempdir().unwrap();

    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    config.persistence.database_path = temp_dir.path().join("test.db");
    config.tools.ytdlp_path = Some(PathBuf::from("/bin/sh"));
    config.tools.cookies_file = temp_dir.path().join("cookies.txt");

    let downloader = MediaDownloader::new(config).await.unwrap();
    (downloader, temp_dir)
}

/// Write an executable shell script that stands in for yt-dlp
///
/// The script ignores the real argument vector and plays back whatever
/// output/exit behavior the test needs, which lets supervision run against
/// a real process without a yt-dlp install.
#[cfg(unix)]
pub(crate) fn stub_tool(dir: &TempDir, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.path().join("fake-yt-dlp");
    let script = format!("#!/bin/sh\n{}\n", body);
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Create a test downloader whose tool is a scripted stand-in
#[cfg(unix)]
pub(crate) async fn create_downloader_with_stub(body: &str) -> (MediaDownloader, TempDir) {
    let temp_dir = tempdir().unwrap();

    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    config.persistence.database_path = temp_dir.path().join("test.db");
    config.tools.ytdlp_path = Some(stub_tool(&temp_dir, body));
    config.tools.cookies_file = temp_dir.path().join("cookies.txt");

    let downloader = MediaDownloader::new(config).await.unwrap();
    (downloader, temp_dir)
}

/// A valid download request for tests
pub(crate) fn sample_request() -> crate::types::DownloadRequest {
    crate::types::DownloadRequest {
        url: "https://example.com/watch?v=abc".to_string(),
        format: crate::types::RequestedFormat {
            id: "best".to_string(),
            label: "Best available".to_string(),
        },
        title: "T".to_string(),
        thumbnail: "X".to_string(),
    }
}

/// Poll until a download reaches a terminal state or the timeout elapses
pub(crate) async fn wait_for_terminal(
    downloader: &MediaDownloader,
    id: crate::types::DownloadId,
) -> crate::types::DownloadItem {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(10);

    loop {
        let item = downloader.get_download(id).await.unwrap().unwrap();
        if item.status.is_terminal() {
            return item;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("download {} never reached a terminal state", id);
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
}
