use crate::db::*;
use tempfile::NamedTempFile;


/// Helper to open a Database backed by a fresh temp file
async fn test_db() -> (Database, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();
    (db, temp_file)
}

/// Helper producing a NewDownload with distinguishable fields
fn sample_download(n: u32) -> NewDownload {
    NewDownload {
        url: format!("https://example.com/watch?v={}", n),
        title: format!("Video {}", n),
        thumbnail: format!("https://example.com/thumb{}.jpg", n),
        format_id: "best".to_string(),
        format_label: "Best available".to_string(),
    }
}
