//! History records and the ordered history document.

use chrono::{DateTime, Duration, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// One answered query and the file holding its result rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct QueryRecord {
    /// Exact search expression; the cache key
    query_text: String,
    /// When the record was created or last refreshed
    timestamp: DateTime<Utc>,
    /// File holding one result row per line
    file_path: PathBuf,
    /// Number of rows saved
    count: usize,
}

impl QueryRecord {
    /// Create a record stamped with `timestamp`.
    pub fn new(
        query_text: impl Into<String>,
        file_path: impl Into<PathBuf>,
        count: usize,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            query_text: query_text.into(),
            timestamp,
            file_path: file_path.into(),
            count,
        }
    }

    /// Time elapsed between the record's timestamp and `now`.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.timestamp)
    }

    /// True while `now - timestamp` is strictly below `window`.
    pub fn is_fresh(&self, window: Duration, now: DateTime<Utc>) -> bool {
        self.age(now) < window
    }

    /// Whether the result file still exists on disk.
    pub fn file_exists(&self) -> bool {
        self.file_path.is_file()
    }

    pub(crate) fn points_at(&self, path: &Path) -> bool {
        self.file_path == path
    }
}

/// Most-recent-first list of query records.
///
/// Serialized as `{"queries": [...]}`. A `null` list is read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    #[serde(default, deserialize_with = "null_as_empty")]
    queries: Vec<QueryRecord>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<QueryRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<QueryRecord>>::deserialize(deserializer)?.unwrap_or_default())
}

impl History {
    /// Build a history from records already in most-recent-first order.
    pub fn from_records(queries: Vec<QueryRecord>) -> Self {
        Self { queries }
    }

    /// All records, most recent first.
    pub fn records(&self) -> &[QueryRecord] {
        &self.queries
    }

    /// Consume the history, yielding its records.
    pub fn into_records(self) -> Vec<QueryRecord> {
        self.queries
    }

    /// Iterate records, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &QueryRecord> {
        self.queries.iter()
    }

    /// At most `limit` of the most recent records.
    pub fn recent(&self, limit: usize) -> &[QueryRecord] {
        &self.queries[..self.queries.len().min(limit)]
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// True when there are no records.
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// The first record with exactly this query text.
    pub fn find(&self, query_text: &str) -> Option<&QueryRecord> {
        self.queries.iter().find(|q| q.query_text == query_text)
    }

    /// Whether any record references `path`.
    pub fn references(&self, path: &Path) -> bool {
        self.queries.iter().any(|q| q.points_at(path))
    }

    /// Put `record` at the front.
    ///
    /// The first record sharing its query text is removed beforehand and
    /// returned as the first element of the tuple. Records past
    /// `max_size` are dropped from the tail and returned as the second.
    /// A `max_size` of zero is treated as one, so `record` is always kept.
    pub fn push_front(
        &mut self,
        record: QueryRecord,
        max_size: usize,
    ) -> (Option<QueryRecord>, Vec<QueryRecord>) {
        let replaced = self
            .queries
            .iter()
            .position(|q| q.query_text == record.query_text)
            .map(|pos| self.queries.remove(pos));

        self.queries.insert(0, record);

        let max_size = max_size.max(1);
        let evicted = if self.queries.len() > max_size {
            self.queries.split_off(max_size)
        } else {
            Vec::new()
        };

        (replaced, evicted)
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a QueryRecord;
    type IntoIter = std::slice::Iter<'a, QueryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.queries.iter()
    }
}
