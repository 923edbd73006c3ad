//! Single-writer actor owning all history access.
//!
//! Request handlers run concurrently, but the history file is a
//! read-modify-write document. Routing every operation through one task
//! means two `add_query` calls can never interleave their load and save.

use crate::{AddOutcome, CacheConfig, CacheResult, History, HistoryManager, QueryRecord};
use chrono::{DateTime, Utc};
use fofa_error::{CacheError, CacheErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

const CHANNEL_CAPACITY: usize = 64;

/// Message types for the history actor.
#[derive(Debug)]
pub enum HistoryMessage {
    /// Look up a record by query text
    Find {
        /// Query text to look up
        query_text: String,
        /// Reply channel
        reply: oneshot::Sender<CacheResult<Option<QueryRecord>>>,
    },
    /// Register a result file for a query
    Add {
        /// Query text
        query_text: String,
        /// Result file path
        file_path: PathBuf,
        /// Number of rows in the file
        count: usize,
        /// Reply channel
        reply: oneshot::Sender<CacheResult<AddOutcome>>,
    },
    /// Read the full history
    Load {
        /// Reply channel
        reply: oneshot::Sender<CacheResult<History>>,
    },
    /// Stop the actor
    Shutdown,
}

/// Actor that owns the [`HistoryManager`] and applies messages one at a time.
pub struct HistoryActor {
    manager: HistoryManager,
    rx: mpsc::Receiver<HistoryMessage>,
}

impl HistoryActor {
    /// Creates a new history actor.
    pub fn new(manager: HistoryManager, rx: mpsc::Receiver<HistoryMessage>) -> Self {
        Self { manager, rx }
    }

    /// Runs the actor loop until shutdown or until every handle is dropped.
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        info!("History actor started");

        while let Some(msg) = self.rx.recv().await {
            match msg {
                HistoryMessage::Find { query_text, reply } => {
                    let result = self
                        .blocking(move |manager| manager.find_cache(&query_text))
                        .await;
                    let _ = reply.send(result);
                }
                HistoryMessage::Add {
                    query_text,
                    file_path,
                    count,
                    reply,
                } => {
                    let result = self
                        .blocking(move |manager| manager.add_query(&query_text, &file_path, count))
                        .await;
                    let _ = reply.send(result);
                }
                HistoryMessage::Load { reply } => {
                    let result = self.blocking(|manager| manager.load_history()).await;
                    let _ = reply.send(result);
                }
                HistoryMessage::Shutdown => {
                    info!("History actor shutting down");
                    break;
                }
            }
        }

        debug!("History actor stopped");
    }

    /// Run a manager call on the blocking pool and wait for it, keeping the
    /// actor busy until the file I/O is done.
    async fn blocking<T, F>(&self, f: F) -> CacheResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&HistoryManager) -> CacheResult<T> + Send + 'static,
    {
        let manager = self.manager.clone();
        tokio::task::spawn_blocking(move || f(&manager))
            .await
            .map_err(|e| CacheError::new(CacheErrorKind::Unavailable(e.to_string())))?
    }
}

/// Cloneable front-end to a running [`HistoryActor`].
///
/// # Example
///
/// ```
/// use fofa_cache::{CacheConfig, HistoryHandle, HistoryManager};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let manager = HistoryManager::new(CacheConfig::default())?;
/// manager.init()?;
/// let (handle, task) = HistoryHandle::spawn(manager);
///
/// let history = handle.load_history().await?;
/// println!("{} cached queries", history.len());
///
/// handle.shutdown().await;
/// task.await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HistoryHandle {
    tx: mpsc::Sender<HistoryMessage>,
    config: Arc<CacheConfig>,
}

impl HistoryHandle {
    /// Spawn the actor on the current tokio runtime.
    pub fn spawn(manager: HistoryManager) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let config = Arc::new(manager.config().clone());
        let actor = HistoryActor::new(manager, rx);
        let task = tokio::spawn(async move {
            actor.run().await;
        });
        (Self { tx, config }, task)
    }

    /// Configuration of the underlying manager.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// See [`HistoryManager::find_cache`].
    pub async fn find_cache(&self, query_text: &str) -> CacheResult<Option<QueryRecord>> {
        let (reply, rx) = oneshot::channel();
        self.request(
            HistoryMessage::Find {
                query_text: query_text.to_string(),
                reply,
            },
            rx,
        )
        .await
    }

    /// A record that is present and fresh at `now`.
    pub async fn find_fresh(
        &self,
        query_text: &str,
        now: DateTime<Utc>,
    ) -> CacheResult<Option<QueryRecord>> {
        Ok(self
            .find_cache(query_text)
            .await?
            .filter(|record| self.is_fresh(record, now)))
    }

    /// See [`HistoryManager::add_query`].
    pub async fn add_query(
        &self,
        query_text: &str,
        file_path: impl Into<PathBuf>,
        count: usize,
    ) -> CacheResult<AddOutcome> {
        let (reply, rx) = oneshot::channel();
        self.request(
            HistoryMessage::Add {
                query_text: query_text.to_string(),
                file_path: file_path.into(),
                count,
                reply,
            },
            rx,
        )
        .await
    }

    /// See [`HistoryManager::load_history`].
    pub async fn load_history(&self) -> CacheResult<History> {
        let (reply, rx) = oneshot::channel();
        self.request(HistoryMessage::Load { reply }, rx).await
    }

    /// See [`HistoryManager::resolve_cache_path`].
    pub fn resolve_cache_path(&self, filename: impl AsRef<Path>) -> PathBuf {
        self.config.cache_dir().join(filename)
    }

    /// See [`HistoryManager::is_fresh`].
    pub fn is_fresh(&self, record: &QueryRecord, now: DateTime<Utc>) -> bool {
        record.is_fresh(self.config.expiration(), now)
    }

    /// Ask the actor to stop after the messages already queued.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(HistoryMessage::Shutdown).await;
    }

    async fn request<T>(
        &self,
        msg: HistoryMessage,
        rx: oneshot::Receiver<CacheResult<T>>,
    ) -> CacheResult<T> {
        self.tx.send(msg).await.map_err(|_| {
            CacheError::new(CacheErrorKind::Unavailable("history actor stopped".to_string()))
        })?;
        rx.await.map_err(|_| {
            CacheError::new(CacheErrorKind::Unavailable(
                "history actor dropped the request".to_string(),
            ))
        })?
    }
}
