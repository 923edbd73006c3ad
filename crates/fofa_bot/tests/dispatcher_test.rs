//! End-to-end tests for the command dispatcher with an in-memory backend.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use fofa_bot::{BotConfig, Caller, Command, CommandDispatcher, Reply};
use fofa_cache::{CacheConfig, History, HistoryHandle, HistoryManager, QueryRecord};
use fofa_client::{
    AccountInfo, FofaApiError, FofaApiErrorKind, FofaApiResult, SearchBackend, SearchRequest,
    SearchResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const ADMIN: u64 = 1;
const STRANGER: u64 = 99;

#[derive(Default)]
struct FakeState {
    total: usize,
    rows: Vec<String>,
    fail: Option<FofaApiErrorKind>,
    calls: AtomicUsize,
    requests: Mutex<Vec<SearchRequest>>,
}

struct FakeBackend(Arc<FakeState>);

#[async_trait]
impl SearchBackend for FakeBackend {
    async fn search(&self, request: &SearchRequest) -> FofaApiResult<SearchResult> {
        self.0.calls.fetch_add(1, Ordering::SeqCst);
        self.0.requests.lock().unwrap().push(request.clone());
        if let Some(kind) = &self.0.fail {
            return Err(FofaApiError::new(kind.clone()));
        }
        Ok(SearchResult::new(
            request.query().clone(),
            self.0.total,
            self.0.rows.clone(),
        ))
    }

    async fn account_info(&self) -> FofaApiResult<AccountInfo> {
        Ok(serde_json::from_value(serde_json::json!({
            "email": "ops@example.com",
            "username": "ops",
            "isvip": true,
            "vip_level": 1,
            "fcoin": 10
        }))
        .unwrap())
    }
}

fn cache_config(dir: &TempDir) -> CacheConfig {
    CacheConfig::default()
        .with_cache_dir(dir.path().join("fofa_cache"))
        .with_history_file(dir.path().join("history.json"))
}

fn settings(dir: &TempDir, admins: Vec<u64>) -> BotConfig {
    BotConfig::default()
        .with_apis(vec!["key".to_string()])
        .with_admins(admins)
        .with_cache(cache_config(dir))
}

fn dispatcher_with(
    dir: &TempDir,
    state: Option<Arc<FakeState>>,
    settings: BotConfig,
) -> CommandDispatcher<FakeBackend> {
    let manager = HistoryManager::new(settings.cache().clone()).unwrap();
    manager.init().unwrap();
    let (history, _task) = HistoryHandle::spawn(manager);
    CommandDispatcher::new(history, state.map(FakeBackend), settings)
}

fn rows(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("10.0.0.{}:80", i)).collect()
}

fn admin() -> Caller {
    Caller::new(ADMIN, "alice")
}

#[tokio::test]
async fn test_cache_miss_then_hit() {
    let dir = TempDir::new().unwrap();
    let state = Arc::new(FakeState {
        total: 500,
        rows: rows(3),
        ..FakeState::default()
    });
    let dispatcher = dispatcher_with(&dir, Some(state.clone()), settings(&dir, vec![ADMIN]));

    let first = dispatcher
        .dispatch(&admin(), Command::Search("app=\"nginx\"".to_string()))
        .await;
    let Reply::Document { path, caption } = first else {
        panic!("expected a document");
    };
    assert!(caption.contains("500 records in total (3 downloaded)"));
    assert!(path.starts_with(dir.path().join("fofa_cache")));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "10.0.0.0:80\n10.0.0.1:80\n10.0.0.2:80\n"
    );

    let second = dispatcher
        .dispatch(&admin(), Command::Search("app=\"nginx\"".to_string()))
        .await;
    let Reply::Document {
        path: cached_path,
        caption,
    } = second
    else {
        panic!("expected a cached document");
    };
    assert!(caption.starts_with("✅ Returned from cache"));
    assert_eq!(cached_path, path);
    assert_eq!(state.calls.load(Ordering::SeqCst), 1);

    let request = state.requests.lock().unwrap()[0].clone();
    assert_eq!(*request.size(), 10_000);
    assert_eq!(request.fields(), "host");
    assert_eq!(*request.page(), 1);
}

#[tokio::test]
async fn test_expired_record_triggers_remote_search() {
    let dir = TempDir::new().unwrap();
    let config = cache_config(&dir);
    let manager = HistoryManager::new(config.clone()).unwrap();
    manager.init().unwrap();
    let old_file = manager.resolve_cache_path("old.txt");
    std::fs::write(&old_file, "stale\n").unwrap();
    manager
        .save_history(&History::from_records(vec![QueryRecord::new(
            "port=\"6379\"",
            &old_file,
            1,
            Utc::now() - Duration::hours(25),
        )]))
        .unwrap();

    let state = Arc::new(FakeState {
        total: 2,
        rows: rows(2),
        ..FakeState::default()
    });
    let dispatcher = dispatcher_with(&dir, Some(state.clone()), settings(&dir, vec![ADMIN]));

    let reply = dispatcher
        .dispatch(&admin(), Command::Search("port=\"6379\"".to_string()))
        .await;
    assert!(reply.text().starts_with("✅ Search complete"));
    assert_eq!(state.calls.load(Ordering::SeqCst), 1);

    let history = manager.load_history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(*history.records()[0].count(), 2);
    assert_ne!(history.records()[0].file_path(), &old_file);
}

#[tokio::test]
async fn test_empty_results() {
    let dir = TempDir::new().unwrap();
    let state = Arc::new(FakeState::default());
    let dispatcher = dispatcher_with(&dir, Some(state), settings(&dir, vec![ADMIN]));

    let reply = dispatcher
        .dispatch(&admin(), Command::Search("title=\"nothing\"".to_string()))
        .await;
    assert_eq!(reply, Reply::Text("🤷 No results found.".to_string()));
}

#[tokio::test]
async fn test_empty_query_shows_usage() {
    let dir = TempDir::new().unwrap();
    let state = Arc::new(FakeState::default());
    let dispatcher = dispatcher_with(&dir, Some(state.clone()), settings(&dir, vec![ADMIN]));

    let reply = dispatcher.handle_text(&admin(), "/search   ").await.unwrap();
    assert!(reply.text().starts_with("Usage: /search"));
    assert_eq!(state.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_api_key() {
    let dir = TempDir::new().unwrap();
    let dispatcher = dispatcher_with(&dir, None, settings(&dir, vec![ADMIN]));

    let reply = dispatcher
        .dispatch(&admin(), Command::Search("x".to_string()))
        .await;
    assert_eq!(reply, Reply::Text("❌ No FOFA API key configured".to_string()));
}

#[tokio::test]
async fn test_remote_error_becomes_reply() {
    let dir = TempDir::new().unwrap();
    let state = Arc::new(FakeState {
        fail: Some(FofaApiErrorKind::Api("[-700] Account Invalid".to_string())),
        ..FakeState::default()
    });
    let dispatcher = dispatcher_with(&dir, Some(state), settings(&dir, vec![ADMIN]));

    let reply = dispatcher
        .dispatch(&admin(), Command::Search("x".to_string()))
        .await;
    assert!(reply.text().starts_with("❌ Query failed"));
    assert!(reply.text().contains("Account Invalid"));

    let history = HistoryManager::new(cache_config(&dir)).unwrap().load_history().unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_permission_gate() {
    let dir = TempDir::new().unwrap();
    let state = Arc::new(FakeState {
        total: 1,
        rows: rows(1),
        ..FakeState::default()
    });
    let dispatcher = dispatcher_with(&dir, Some(state.clone()), settings(&dir, vec![ADMIN]));
    let stranger = Caller::new(STRANGER, "mallory");

    for text in ["/search x", "/host 1.1.1.1", "/stats x", "/info", "/settings"] {
        let reply = dispatcher.handle_text(&stranger, text).await.unwrap();
        assert!(reply.text().starts_with("⛔️"), "{} was not denied", text);
    }
    assert_eq!(state.calls.load(Ordering::SeqCst), 0);

    let reply = dispatcher.handle_text(&stranger, "/history").await.unwrap();
    assert_eq!(reply.text(), "Query history is empty.");
}

#[tokio::test]
async fn test_public_mode_opens_search() {
    let dir = TempDir::new().unwrap();
    let state = Arc::new(FakeState {
        total: 1,
        rows: rows(1),
        ..FakeState::default()
    });
    let dispatcher = dispatcher_with(
        &dir,
        Some(state.clone()),
        settings(&dir, vec![ADMIN]).with_public_mode(true),
    );
    let stranger = Caller::new(STRANGER, "bob");

    let reply = dispatcher.handle_text(&stranger, "/search x").await.unwrap();
    assert!(matches!(reply, Reply::Document { .. }));

    let reply = dispatcher.handle_text(&stranger, "/settings").await.unwrap();
    assert!(reply.text().starts_with("⛔️"));
}

#[tokio::test]
async fn test_start_registers_first_admin_and_persists() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("fofa.toml");
    let dispatcher = dispatcher_with(&dir, None, settings(&dir, Vec::new()))
        .with_config_path(&config_path);

    let reply = dispatcher.handle_text(&Caller::new(7, "carol"), "/start").await.unwrap();
    assert!(reply.text().contains("added as the first admin"));
    assert!(reply.text().contains("Welcome, carol!"));
    assert_eq!(dispatcher.settings().admins(), &vec![7]);

    let saved = BotConfig::from_toml_str(&std::fs::read_to_string(&config_path).unwrap()).unwrap();
    assert_eq!(saved.admins(), &vec![7]);

    let reply = dispatcher.handle_text(&Caller::new(8, "dave"), "/start").await.unwrap();
    assert!(!reply.text().contains("first admin"));
    assert_eq!(dispatcher.settings().admins(), &vec![7]);
}

#[tokio::test]
async fn test_host_shows_first_ten_rows() {
    let dir = TempDir::new().unwrap();
    let state = Arc::new(FakeState {
        total: 15,
        rows: rows(15),
        ..FakeState::default()
    });
    let dispatcher = dispatcher_with(&dir, Some(state.clone()), settings(&dir, vec![ADMIN]));

    let reply = dispatcher.handle_text(&admin(), "/host example.com").await.unwrap();
    let text = reply.text();
    assert!(text.contains("15 services found"));
    assert_eq!(text.matches("• ").count(), 10);
    assert!(text.contains("(showing first 10)"));

    let request = state.requests.lock().unwrap()[0].clone();
    assert_eq!(request.query(), "host=\"example.com\"");
    assert_eq!(request.fields(), "ip,port,protocol,title,server");
    assert_eq!(*request.size(), 100);
}

#[tokio::test]
async fn test_history_lists_ten_most_recent() {
    let dir = TempDir::new().unwrap();
    let state = Arc::new(FakeState {
        total: 1,
        rows: rows(1),
        ..FakeState::default()
    });
    let dispatcher = dispatcher_with(&dir, Some(state), settings(&dir, vec![ADMIN]));

    for i in 0..12 {
        dispatcher
            .dispatch(&admin(), Command::Search(format!("q{}", i)))
            .await;
    }

    let reply = dispatcher.handle_text(&admin(), "/history").await.unwrap();
    let text = reply.text();
    assert!(text.contains("1. q11"));
    assert!(text.contains("10. q2"));
    assert!(!text.contains("q1\n"));
    assert!(!text.contains("11. "));
}

#[tokio::test]
async fn test_stats_info_and_unknown() {
    let dir = TempDir::new().unwrap();
    let state = Arc::new(FakeState::default());
    let dispatcher = dispatcher_with(&dir, Some(state), settings(&dir, vec![ADMIN]));

    let reply = dispatcher.handle_text(&admin(), "/stats app=\"x\"").await.unwrap();
    assert!(reply.text().contains("not available"));

    let reply = dispatcher.handle_text(&admin(), "/info").await.unwrap();
    assert!(reply.text().contains("ops@example.com"));

    let reply = dispatcher.handle_text(&admin(), "/reboot").await.unwrap();
    assert!(reply.text().starts_with("Unknown command"));

    assert!(dispatcher.handle_text(&admin(), "just chatting").await.is_none());
}
