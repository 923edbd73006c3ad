//! Result files: one row per line, written verbatim.

use crate::{CacheConfig, CacheResult};
use chrono::{DateTime, Utc};
use fofa_error::{CacheError, CacheErrorKind};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Writes and reads the plain-text result files kept in the cache directory.
///
/// Files carry no header and no escaping. Writes go through a temp file and
/// a rename, so a file referenced by the history is always complete.
#[derive(Debug, Clone)]
pub struct ResultFileStore {
    cache_dir: PathBuf,
}

impl ResultFileStore {
    /// Create a store rooted at `cache_dir`. Performs no I/O.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Create a store for the cache directory of `config`.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.cache_dir().clone())
    }

    /// Directory the store writes into.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Generate a result file name: `fofa_<unix-seconds>_<8 hex>.txt`.
    ///
    /// The random suffix keeps two searches finishing in the same second
    /// from sharing a file.
    pub fn generate_filename(now: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("fofa_{}_{}.txt", now.timestamp(), &suffix[..8])
    }

    /// Write `rows` to a newly named file and return its path.
    pub async fn write_rows(&self, rows: &[String]) -> CacheResult<PathBuf> {
        let filename = Self::generate_filename(Utc::now());
        self.write_rows_named(&filename, rows).await
    }

    /// Write `rows` to `filename` inside the cache directory.
    #[tracing::instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn write_rows_named(&self, filename: &str, rows: &[String]) -> CacheResult<PathBuf> {
        tokio::fs::create_dir_all(&self.cache_dir).await.map_err(|e| {
            CacheError::new(CacheErrorKind::Io(format!(
                "create {}: {}",
                self.cache_dir.display(),
                e
            )))
        })?;

        let path = self.cache_dir.join(filename);
        let mut content = String::with_capacity(rows.iter().map(|r| r.len() + 1).sum());
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, content.as_bytes())
            .await
            .map_err(|e| {
                CacheError::new(CacheErrorKind::Io(format!(
                    "write {}: {}",
                    temp_path.display(),
                    e
                )))
            })?;

        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(CacheError::new(CacheErrorKind::Io(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))));
        }

        tracing::info!(path = %path.display(), rows = rows.len(), "Stored result file");
        Ok(path)
    }

    /// Read the rows of a result file.
    ///
    /// Rows are split on `\n` only, so a trailing `\r` stays part of its row.
    pub async fn read_rows(path: impl AsRef<Path>) -> CacheResult<Vec<String>> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            CacheError::new(CacheErrorKind::Io(format!("read {}: {}", path.display(), e)))
        })?;
        Ok(split_rows(&content))
    }
}

fn split_rows(content: &str) -> Vec<String> {
    let mut rows: Vec<String> = content.split('\n').map(str::to_string).collect();
    if rows.last().is_some_and(String::is_empty) {
        rows.pop();
    }
    rows
}
