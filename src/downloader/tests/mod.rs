use super::test_helpers::*;
use crate::types::{DownloadId, Event, Status};


/// Insert a bare record directly, bypassing process spawn
async fn insert_record(downloader: &crate::MediaDownloader) -> DownloadId {
    downloader
        .db
        .insert_download(&crate::db::NewDownload {
            url: "https://example.com/v".into(),
            title: "T".into(),
            thumbnail: "X".into(),
            format_id: "best".into(),
            format_label: "Best".into(),
        })
        .await
        .unwrap()
}
