//! History manager: load, mutate and persist the query history.

use crate::{CacheConfig, CacheResult, EvictionPolicy, History, QueryRecord};
use chrono::{DateTime, Utc};
use fofa_error::{CacheError, CacheErrorKind};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Result of [`HistoryManager::add_query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    /// The record now at the front of the history
    pub record: QueryRecord,
    /// Previous record for the same query text, if any
    pub replaced: Option<QueryRecord>,
    /// Records dropped from the tail to respect the size limit
    pub evicted: Vec<QueryRecord>,
}

/// Owner of the on-disk history document.
///
/// Holds configuration only. Every operation re-reads the history file, so
/// two managers over the same paths see each other's writes. Mutations made
/// concurrently through separate managers are last-writer-wins; go through
/// [`HistoryHandle`](crate::HistoryHandle) to serialize them.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    config: CacheConfig,
}

impl HistoryManager {
    /// Create a manager for the given configuration. Performs no I/O.
    ///
    /// # Errors
    ///
    /// Returns [`CacheErrorKind::InvalidConfig`] when the configuration is
    /// unusable, such as a history limit of zero.
    pub fn new(config: CacheConfig) -> CacheResult<Self> {
        config
            .validate()
            .map_err(|e| CacheError::new(CacheErrorKind::InvalidConfig(e)))?;
        Ok(Self { config })
    }

    /// The configuration this manager was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Ensure the cache directory exists.
    ///
    /// # Errors
    ///
    /// Returns [`CacheErrorKind::Io`] if the directory cannot be created.
    #[tracing::instrument(skip(self), fields(cache_dir = %self.config.cache_dir().display()))]
    pub fn init(&self) -> CacheResult<()> {
        let dir = self.config.cache_dir();
        fs::create_dir_all(dir).map_err(|e| {
            CacheError::new(CacheErrorKind::Io(format!(
                "create {}: {}",
                dir.display(),
                e
            )))
        })?;
        tracing::debug!("Cache directory ready");
        Ok(())
    }

    /// Read the persisted history.
    ///
    /// A missing history file is the first-run case and yields an empty
    /// history.
    ///
    /// # Errors
    ///
    /// - [`CacheErrorKind::Io`] if the file exists but cannot be read
    /// - [`CacheErrorKind::DataCorruption`] if it cannot be parsed
    #[tracing::instrument(skip(self), fields(history_file = %self.config.history_file().display()))]
    pub fn load_history(&self) -> CacheResult<History> {
        let path = self.config.history_file();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No history file yet, starting empty");
                return Ok(History::default());
            }
            Err(e) => {
                return Err(CacheError::new(CacheErrorKind::Io(format!(
                    "read {}: {}",
                    path.display(),
                    e
                ))));
            }
        };

        let history: History = serde_json::from_str(&content).map_err(|e| {
            tracing::warn!(error = %e, "History file is corrupt");
            CacheError::new(CacheErrorKind::DataCorruption(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;

        tracing::debug!(records = history.len(), "Loaded history");
        Ok(history)
    }

    /// Persist the full history.
    ///
    /// Writes a uniquely named temp file beside the history file and renames
    /// it into place, so readers see either the old or the new document.
    ///
    /// # Errors
    ///
    /// Returns [`CacheErrorKind::Io`] on any write or rename failure.
    #[tracing::instrument(skip(self, history), fields(records = history.len()))]
    pub fn save_history(&self, history: &History) -> CacheResult<()> {
        let data = serde_json::to_string_pretty(history)
            .map_err(|e| CacheError::new(CacheErrorKind::Serialization(e.to_string())))?;
        write_atomic(self.config.history_file(), data.as_bytes())?;
        tracing::debug!("Saved history");
        Ok(())
    }

    /// Look up the record for `query_text`.
    ///
    /// Records whose result file no longer exists are treated as misses.
    /// Freshness is not checked here; see [`HistoryManager::is_fresh`].
    ///
    /// # Errors
    ///
    /// Propagates [`HistoryManager::load_history`] failures.
    #[tracing::instrument(skip(self))]
    pub fn find_cache(&self, query_text: &str) -> CacheResult<Option<QueryRecord>> {
        let history = self.load_history()?;
        let mut matches = history.iter().filter(|q| q.query_text() == query_text);

        let found = matches.find(|q| {
            let exists = q.file_exists();
            if !exists {
                tracing::debug!(
                    file = %q.file_path().display(),
                    "Cached result file missing, treating as miss"
                );
            }
            exists
        });

        tracing::debug!(hit = found.is_some(), "Cache lookup");
        Ok(found.cloned())
    }

    /// Look up a record that is both present and still fresh at `now`.
    pub fn find_fresh(
        &self,
        query_text: &str,
        now: DateTime<Utc>,
    ) -> CacheResult<Option<QueryRecord>> {
        Ok(self
            .find_cache(query_text)?
            .filter(|record| self.is_fresh(record, now)))
    }

    /// Register a freshly written result file for `query_text`.
    ///
    /// Replaces any earlier record for the same text, puts the new record
    /// first, trims the history to `max_history_size` and saves it.
    ///
    /// # Errors
    ///
    /// Propagates load and save failures. Nothing is written if loading fails.
    #[tracing::instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub fn add_query(
        &self,
        query_text: &str,
        file_path: impl AsRef<Path>,
        count: usize,
    ) -> CacheResult<AddOutcome> {
        let mut history = self.load_history()?;

        let record = QueryRecord::new(query_text, file_path.as_ref(), count, Utc::now());
        let (replaced, evicted) =
            history.push_front(record.clone(), *self.config.max_history_size());

        self.save_history(&history)?;

        if !evicted.is_empty() {
            tracing::info!(
                evicted = evicted.len(),
                policy = ?self.config.eviction(),
                "History limit reached, evicted oldest records"
            );
        }

        if *self.config.eviction() == EvictionPolicy::DeleteFiles {
            replaced
                .iter()
                .chain(evicted.iter())
                .filter(|old| !history.references(old.file_path()))
                .for_each(|old| remove_result_file(old.file_path()));
        }

        Ok(AddOutcome {
            record,
            replaced,
            evicted,
        })
    }

    /// Join the cache directory and `filename`. Pure, no I/O.
    pub fn resolve_cache_path(&self, filename: impl AsRef<Path>) -> PathBuf {
        self.config.cache_dir().join(filename)
    }

    /// Whether `record` is inside the configured freshness window at `now`.
    pub fn is_fresh(&self, record: &QueryRecord, now: DateTime<Utc>) -> bool {
        record.is_fresh(self.config.expiration(), now)
    }
}

fn remove_result_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!(file = %path.display(), "Deleted evicted result file"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(file = %path.display(), error = %e, "Failed to delete evicted result file"),
    }
}

/// Write `data` to `path` through a temp file in the same directory.
fn write_atomic(path: &Path, data: &[u8]) -> CacheResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            CacheError::new(CacheErrorKind::Io(format!(
                "create {}: {}",
                parent.display(),
                e
            )))
        })?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "history.json".to_string());
    let temp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

    let write = || -> std::io::Result<()> {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()
    };

    if let Err(e) = write() {
        let _ = fs::remove_file(&temp_path);
        return Err(CacheError::new(CacheErrorKind::Io(format!(
            "write {}: {}",
            temp_path.display(),
            e
        ))));
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        CacheError::new(CacheErrorKind::Io(format!(
            "rename {} to {}: {}",
            temp_path.display(),
            path.display(),
            e
        )))
    })
}
