use chrono::{TimeZone, Utc};
use kisan_core::history::{HistoryRecord, HistoryRepository};
use kisan_infrastructure::{JsonHistoryRepository, KisanPaths};
use tempfile::TempDir;

fn record(n: u32) -> HistoryRecord {
    HistoryRecord::at(
        format!("query {n}"),
        "en",
        format!("answer {n}"),
        Utc.with_ymd_and_hms(2024, 6, 1, 8, n, 0).unwrap(),
    )
}

#[tokio::test]
async fn test_load_missing_file_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let repo = JsonHistoryRepository::with_path(temp_dir.path().join("history.json"));

    let records = repo.load().await.expect("missing file should load");
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_save_and_load_preserves_order() {
    let temp_dir = TempDir::new().unwrap();
    let paths = KisanPaths::new(Some(temp_dir.path().to_path_buf()));
    let repo = JsonHistoryRepository::new(&paths).unwrap();

    let records = vec![record(1), record(2), record(3)];
    repo.save(&records).await.unwrap();

    let loaded = repo.load().await.unwrap();
    assert_eq!(loaded, records);
}

#[tokio::test]
async fn test_save_overwrites_whole_sequence() {
    let temp_dir = TempDir::new().unwrap();
    let repo = JsonHistoryRepository::with_path(temp_dir.path().join("history.json"));

    repo.save(&[record(1), record(2)]).await.unwrap();
    repo.save(&[record(3)]).await.unwrap();

    let loaded = repo.load().await.unwrap();
    assert_eq!(loaded, vec![record(3)]);
}

#[tokio::test]
async fn test_file_is_json_array() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("history.json");
    let repo = JsonHistoryRepository::with_path(path.clone());

    repo.save(&[record(1)]).await.unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let array = raw.as_array().expect("history should be a JSON array");
    assert_eq!(array.len(), 1);
    assert_eq!(array[0]["query"], "query 1");
    assert_eq!(array[0]["language"], "en");
    assert_eq!(array[0]["answer"], "answer 1");
    assert!(array[0]["timestamp"].as_str().unwrap().starts_with("2024-06-01T08:01:00"));
}

#[tokio::test]
async fn test_corrupt_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("history.json");
    std::fs::write(&path, "[{\"query\": 12").unwrap();

    let repo = JsonHistoryRepository::with_path(path);
    let err = repo.load().await.unwrap_err();
    assert!(err.is_serialization());
}
