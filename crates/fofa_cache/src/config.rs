//! Cache and history configuration.

use chrono::Duration;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default directory holding per-query result files.
pub const DEFAULT_CACHE_DIR: &str = "fofa_cache";
/// Default history file, kept outside the cache directory.
pub const DEFAULT_HISTORY_FILE: &str = "history.json";
/// Default maximum number of history records.
pub const DEFAULT_MAX_HISTORY_SIZE: usize = 50;
/// Default freshness window (24 hours).
pub const DEFAULT_EXPIRATION_SECS: u64 = 24 * 60 * 60;

/// What happens to the result file of a record pushed out of the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Leave the file on disk (it becomes an orphan).
    #[default]
    KeepFiles,
    /// Delete the file once the trimmed history has been saved.
    DeleteFiles,
}

/// Configuration for the query cache.
///
/// # Example
///
/// ```
/// use fofa_cache::{CacheConfig, CacheConfigBuilder, EvictionPolicy};
///
/// let config = CacheConfigBuilder::default()
///     .max_history_size(10usize)
///     .eviction(EvictionPolicy::DeleteFiles)
///     .build()
///     .unwrap();
/// assert_eq!(*config.max_history_size(), 10);
/// assert_eq!(config.cache_dir().to_str(), Some("fofa_cache"));
///
/// let config = CacheConfig::default().with_expiration_secs(60u64);
/// assert_eq!(config.expiration().num_seconds(), 60);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_", into)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct CacheConfig {
    /// Directory holding result files
    #[serde(default = "default_cache_dir")]
    #[builder(setter(into), default = "default_cache_dir()")]
    cache_dir: PathBuf,

    /// Path of the history document
    #[serde(default = "default_history_file")]
    #[builder(setter(into), default = "default_history_file()")]
    history_file: PathBuf,

    /// Maximum number of records kept in history
    #[serde(default = "default_max_history_size")]
    #[builder(default = "default_max_history_size()")]
    max_history_size: usize,

    /// Freshness window in seconds
    #[serde(default = "default_expiration_secs")]
    #[builder(default = "default_expiration_secs()")]
    expiration_secs: u64,

    /// Fate of result files belonging to evicted records
    #[serde(default)]
    #[builder(default)]
    eviction: EvictionPolicy,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_DIR)
}

fn default_history_file() -> PathBuf {
    PathBuf::from(DEFAULT_HISTORY_FILE)
}

fn default_max_history_size() -> usize {
    DEFAULT_MAX_HISTORY_SIZE
}

fn default_expiration_secs() -> u64 {
    DEFAULT_EXPIRATION_SECS
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            history_file: default_history_file(),
            max_history_size: default_max_history_size(),
            expiration_secs: default_expiration_secs(),
            eviction: EvictionPolicy::default(),
        }
    }
}

impl CacheConfig {
    /// Freshness window as a chrono duration.
    pub fn expiration(&self) -> Duration {
        i64::try_from(self.expiration_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }

    /// Check values that serde accepts but the cache cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_history_size == 0 {
            return Err("max_history_size must be at least 1".to_string());
        }
        if self.cache_dir.as_os_str().is_empty() {
            return Err("cache_dir must not be empty".to_string());
        }
        if self.history_file.as_os_str().is_empty() {
            return Err("history_file must not be empty".to_string());
        }
        Ok(())
    }
}

impl CacheConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(0) = self.max_history_size {
            return Err("max_history_size must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = CacheConfig::default();
        assert_eq!(config.cache_dir(), &PathBuf::from("fofa_cache"));
        assert_eq!(config.history_file(), &PathBuf::from("history.json"));
        assert_eq!(*config.max_history_size(), 50);
        assert_eq!(config.expiration(), Duration::hours(24));
        assert_eq!(*config.eviction(), EvictionPolicy::KeepFiles);
    }

    #[test]
    fn test_builder_rejects_zero_history() {
        let result = CacheConfigBuilder::default().max_history_size(0usize).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: CacheConfig =
            serde_json::from_str(r#"{"max_history_size": 5, "eviction": "delete_files"}"#).unwrap();
        assert_eq!(*config.max_history_size(), 5);
        assert_eq!(*config.eviction(), EvictionPolicy::DeleteFiles);
        assert_eq!(*config.expiration_secs(), DEFAULT_EXPIRATION_SECS);
    }

    #[test]
    fn test_validate_zero_history() {
        let config = CacheConfig::default().with_max_history_size(0usize);
        assert!(config.validate().is_err());
        assert!(CacheConfig::default().validate().is_ok());
    }
}
