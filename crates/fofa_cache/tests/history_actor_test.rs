//! Tests for the single-writer history actor and result files.

use chrono::Utc;
use fofa_cache::{CacheConfig, CacheErrorKind, HistoryHandle, HistoryManager, ResultFileStore};
use tempfile::TempDir;

fn config_in(dir: &std::path::Path) -> CacheConfig {
    CacheConfig::default()
        .with_cache_dir(dir.join("fofa_cache"))
        .with_history_file(dir.join("history.json"))
        .with_max_history_size(200usize)
}

#[tokio::test]
async fn test_concurrent_adds_lose_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let manager = HistoryManager::new(config_in(temp_dir.path())).unwrap();
    manager.init().unwrap();
    let (handle, task) = HistoryHandle::spawn(manager);

    let file = handle.resolve_cache_path("shared.txt");
    std::fs::write(&file, "row\n").unwrap();

    let mut joins = Vec::new();
    for i in 0..40 {
        let handle = handle.clone();
        let file = file.clone();
        joins.push(tokio::spawn(async move {
            handle.add_query(&format!("q{i}"), file, i).await
        }));
    }
    for join in joins {
        join.await.unwrap().unwrap();
    }

    let history = handle.load_history().await.unwrap();
    assert_eq!(history.len(), 40);

    handle.shutdown().await;
    task.await.unwrap();
}

#[tokio::test]
async fn test_find_fresh_through_handle() {
    let temp_dir = TempDir::new().unwrap();
    let manager = HistoryManager::new(config_in(temp_dir.path())).unwrap();
    manager.init().unwrap();
    let (handle, _task) = HistoryHandle::spawn(manager);

    let store = ResultFileStore::from_config(handle.config());
    let rows = vec!["1.1.1.1:80".to_string(), "2.2.2.2:443".to_string()];
    let path = store.write_rows(&rows).await.unwrap();

    assert!(handle.find_fresh("A", Utc::now()).await.unwrap().is_none());

    let outcome = handle.add_query("A", &path, rows.len()).await.unwrap();
    assert!(outcome.replaced.is_none());

    let record = handle.find_fresh("A", Utc::now()).await.unwrap().unwrap();
    assert_eq!(*record.count(), 2);
    assert_eq!(ResultFileStore::read_rows(record.file_path()).await.unwrap(), rows);
}

#[tokio::test]
async fn test_handle_reports_stopped_actor() {
    let temp_dir = TempDir::new().unwrap();
    let manager = HistoryManager::new(config_in(temp_dir.path())).unwrap();
    let (handle, task) = HistoryHandle::spawn(manager);

    handle.shutdown().await;
    task.await.unwrap();

    let err = handle.load_history().await.unwrap_err();
    assert!(matches!(err.kind, CacheErrorKind::Unavailable(_)));
}

#[tokio::test]
async fn test_result_rows_written_verbatim() {
    let temp_dir = TempDir::new().unwrap();
    let store = ResultFileStore::new(temp_dir.path().join("fofa_cache"));

    let rows = vec![
        "https://example.com".to_string(),
        "10.0.0.1:8080,http,\"quoted, title\"".to_string(),
    ];
    let path = store.write_rows_named("fofa_1.txt", &rows).await.unwrap();

    assert_eq!(path, temp_dir.path().join("fofa_cache").join("fofa_1.txt"));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "https://example.com\n10.0.0.1:8080,http,\"quoted, title\"\n"
    );
    assert!(!path.with_extension("tmp").exists());
}

#[tokio::test]
async fn test_rows_with_carriage_returns_read_back_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    let store = ResultFileStore::new(temp_dir.path().join("fofa_cache"));

    let rows = vec!["banner\r".to_string(), String::new(), "1.1.1.1:80".to_string()];
    let path = store.write_rows(&rows).await.unwrap();

    assert_eq!(ResultFileStore::read_rows(&path).await.unwrap(), rows);
}
