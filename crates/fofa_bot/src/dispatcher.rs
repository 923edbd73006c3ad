//! Command dispatcher: permission gate, cache-then-remote search, replies.
//!
//! The dispatcher knows nothing about Telegram. It turns a [`Command`] from a
//! [`Caller`] into a [`Reply`], so the same flow backs the chat bot and the
//! command line.

use crate::{AdminList, BotConfig, Command, CommandGate};
use chrono::Utc;
use fofa_cache::{HistoryHandle, QueryRecord, ResultFileStore};
use fofa_client::{SearchBackend, SearchRequest};
use fofa_error::{
    BotErrorKind, FofaApiError, FofaApiErrorKind, FofaError, FofaErrorKind, FofaResult,
    NotImplementedError,
};
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Rows requested for `/search`.
pub const SEARCH_SIZE: usize = 10_000;
/// Fields requested for `/search`.
pub const SEARCH_FIELDS: &str = "host";
/// Rows requested for `/host`.
pub const HOST_SIZE: usize = 100;
/// Fields requested for `/host`.
pub const HOST_FIELDS: &str = "ip,port,protocol,title,server";
/// Items shown in list replies.
pub const DISPLAY_LIMIT: usize = 10;

const SEARCH_USAGE: &str = "Usage: /search <FOFA query>\n\nExample:\n/search domain=\"example.com\"";
const HOST_USAGE: &str = "Usage: /host <ip or domain>\n\nExample:\n/host 1.1.1.1";

const HELP_TEXT: &str = "📖 *FOFA Bot Manual*

*🔍 Asset search*
/search <query> - FOFA search
Example: /search domain=\"example.com\"

*📦 Host lookup*
/host <ip|domain> - host details
Example: /host 1.1.1.1

*📊 Statistics*
/stats <query> - aggregated statistics
/info - account details of the API key

*📚 Other*
/history - recent queries
/settings - current settings (admin)
/help - this manual

*Note:* most commands require admin rights.";

/// Who sent a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Numeric user id
    pub user_id: u64,
    /// Name used in greetings
    pub first_name: String,
}

impl Caller {
    /// Create a caller.
    pub fn new(user_id: u64, first_name: impl Into<String>) -> Self {
        Self {
            user_id,
            first_name: first_name.into(),
        }
    }
}

/// What the transport should send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Plain text message
    Text(String),
    /// Message using Telegram's legacy Markdown
    Markdown(String),
    /// A file with a caption
    Document {
        /// File to upload
        path: PathBuf,
        /// Caption shown under the file
        caption: String,
    },
}

impl Reply {
    /// Text of the reply, or the caption for documents.
    pub fn text(&self) -> &str {
        match self {
            Reply::Text(text) | Reply::Markdown(text) => text,
            Reply::Document { caption, .. } => caption,
        }
    }
}

/// Outcome of the cache-then-remote search flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A fresh cached record answered the query
    Cached(QueryRecord),
    /// The remote service answered and the rows were stored
    Fetched {
        /// Stored result file
        path: PathBuf,
        /// Total matches reported by the service
        total: usize,
        /// Rows downloaded into the file
        downloaded: usize,
    },
    /// The remote service found nothing
    Empty,
}

/// Routes commands to their handlers.
pub struct CommandDispatcher<B> {
    history: HistoryHandle,
    store: ResultFileStore,
    backend: Option<Arc<B>>,
    settings: Arc<RwLock<BotConfig>>,
    config_path: Option<PathBuf>,
}

impl<B: SearchBackend> CommandDispatcher<B> {
    /// Create a dispatcher.
    ///
    /// `backend` is `None` when no API key is configured; remote commands
    /// then answer with an error.
    pub fn new(history: HistoryHandle, backend: Option<B>, settings: BotConfig) -> Self {
        let store = ResultFileStore::from_config(history.config());
        Self {
            history,
            store,
            backend: backend.map(Arc::new),
            settings: Arc::new(RwLock::new(settings)),
            config_path: None,
        }
    }

    /// Persist admin registrations to `path`.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> BotConfig {
        self.settings.read().clone()
    }

    /// Parse `text` and dispatch it. `None` if the text is not a command.
    pub async fn handle_text(&self, caller: &Caller, text: &str) -> Option<Reply> {
        let command = Command::parse(text)?;
        Some(self.dispatch(caller, command).await)
    }

    /// Run `command` for `caller`. Failures become error replies.
    #[instrument(skip(self, caller, command), fields(user_id = caller.user_id, command = command.name()))]
    pub async fn dispatch(&self, caller: &Caller, command: Command) -> Reply {
        let gate = {
            let settings = self.settings.read();
            CommandGate::new(
                AdminList::from_ids(settings.admins()),
                *settings.public_mode(),
            )
        };

        if let Err(e) = gate.check(&command, caller.user_id) {
            info!("Rejected restricted command");
            return error_reply(&e.into());
        }

        let result = match &command {
            Command::Start => Ok(self.start(caller).await),
            Command::Help => Ok(Reply::Markdown(HELP_TEXT.to_string())),
            Command::Search(query) => self.search_reply(query).await,
            Command::Host(target) => self.host(target).await,
            Command::Stats(_) => {
                Err(NotImplementedError::new(command.name(), "Aggregated statistics").into())
            }
            Command::Info => self.info().await,
            Command::History => self.history_reply().await,
            Command::Settings => Ok(self.settings_reply()),
            Command::Unknown(_) => Ok(Reply::Text(
                "Unknown command. Use /help to see available commands.".to_string(),
            )),
        };

        result.unwrap_or_else(|e| {
            warn!(error = %e, "Command failed");
            error_reply(&e)
        })
    }

    /// Answer `query` from a fresh cache record, or search remotely and
    /// store the rows.
    ///
    /// A history file that cannot be read or updated does not block the
    /// search; the failure is logged and the result is still returned.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> FofaResult<SearchOutcome> {
        match self.history.find_fresh(query, Utc::now()).await {
            Ok(Some(record)) => {
                info!(file = %record.file_path().display(), "Serving cached result");
                return Ok(SearchOutcome::Cached(record));
            }
            Ok(None) => debug!("Cache miss"),
            Err(e) => warn!(error = %e, "Cache lookup failed, searching remotely"),
        }

        let full = *self.settings.read().full_mode();
        let request = SearchRequest::first_page(query, SEARCH_FIELDS, SEARCH_SIZE, full);
        let result = self.backend()?.search(&request).await?;

        if *result.total() == 0 {
            return Ok(SearchOutcome::Empty);
        }

        let total = *result.total();
        let rows = result.into_rows();
        let path = self.store.write_rows(&rows).await?;

        if let Err(e) = self.history.add_query(query, &path, rows.len()).await {
            warn!(error = %e, "Failed to record query in history");
        }

        Ok(SearchOutcome::Fetched {
            path,
            total,
            downloaded: rows.len(),
        })
    }

    fn backend(&self) -> FofaResult<&B> {
        self.backend
            .as_deref()
            .ok_or_else(|| FofaApiError::new(FofaApiErrorKind::MissingApiKey).into())
    }

    async fn start(&self, caller: &Caller) -> Reply {
        let registered = {
            let mut settings = self.settings.write();
            if settings.admins().is_empty() && settings.add_admin(caller.user_id) {
                Some(settings.clone())
            } else {
                None
            }
        };

        let mut text = String::new();
        if let Some(snapshot) = registered {
            info!(user_id = caller.user_id, "Registered first admin");
            self.persist(snapshot).await;
            text.push_str(&format!(
                "ℹ️ You (ID: {}) have been added as the first admin.\n\n",
                caller.user_id
            ));
        }

        text.push_str(&format!(
            "👋 Welcome, {}!\n\n\
             This is a FOFA search bot.\n\n\
             🔍 Main features:\n\
             • /search - FOFA asset search\n\
             • /host - host details\n\
             • /stats - aggregated statistics\n\
             • /history - query history\n\n\
             Use /help for the full command list.",
            caller.first_name
        ));
        Reply::Text(text)
    }

    async fn persist(&self, snapshot: BotConfig) {
        let Some(path) = self.config_path.clone() else {
            debug!("No config file attached, admin kept in memory only");
            return;
        };

        match tokio::task::spawn_blocking(move || snapshot.save(&path)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Failed to save configuration"),
            Err(e) => warn!(error = %e, "Configuration save task failed"),
        }
    }

    async fn search_reply(&self, query: &str) -> FofaResult<Reply> {
        if query.is_empty() {
            return Ok(Reply::Text(SEARCH_USAGE.to_string()));
        }

        Ok(match self.search(query).await? {
            SearchOutcome::Cached(record) => Reply::Document {
                path: record.file_path().clone(),
                caption: format!(
                    "✅ Returned from cache\nQuery: {}\n{} records\nCached at: {}",
                    query,
                    record.count(),
                    record.timestamp().format("%Y-%m-%d %H:%M:%S UTC")
                ),
            },
            SearchOutcome::Fetched {
                path,
                total,
                downloaded,
            } => Reply::Document {
                path,
                caption: format!(
                    "✅ Search complete\nQuery: {}\n{} records in total ({} downloaded)",
                    query, total, downloaded
                ),
            },
            SearchOutcome::Empty => Reply::Text("🤷 No results found.".to_string()),
        })
    }

    #[instrument(skip(self))]
    async fn host(&self, target: &str) -> FofaResult<Reply> {
        if target.is_empty() {
            return Ok(Reply::Text(HOST_USAGE.to_string()));
        }

        let full = *self.settings.read().full_mode();
        let request =
            SearchRequest::first_page(format!("host=\"{}\"", target), HOST_FIELDS, HOST_SIZE, full);
        let result = self.backend()?.search(&request).await?;

        if *result.total() == 0 {
            return Ok(Reply::Text(format!(
                "🤷 No information found for {}.",
                target
            )));
        }

        let mut text = format!(
            "📌 Host: {}\n\n{} services found\n\n",
            target,
            result.total()
        );
        for row in result.rows().iter().take(DISPLAY_LIMIT) {
            text.push_str(&format!("• {}\n", row));
        }
        if result.rows().len() > DISPLAY_LIMIT {
            text.push_str(&format!("\n(showing first {})", DISPLAY_LIMIT));
        }
        Ok(Reply::Text(text))
    }

    async fn info(&self) -> FofaResult<Reply> {
        let info = self.backend()?.account_info().await?;
        Ok(Reply::Text(format!(
            "👤 Account\n\nUser: {}\nEmail: {}\nVIP: {} (level {})\nF-coins: {}",
            info.username(),
            info.email(),
            if *info.is_vip() { "yes" } else { "no" },
            info.vip_level(),
            info.fcoins()
        )))
    }

    async fn history_reply(&self) -> FofaResult<Reply> {
        let history = self.history.load_history().await?;
        if history.is_empty() {
            return Ok(Reply::Text("Query history is empty.".to_string()));
        }

        let mut text = String::from("🕰️ Recent queries\n\n");
        for (i, record) in history.recent(DISPLAY_LIMIT).iter().enumerate() {
            text.push_str(&format!(
                "{}. {}\n   {} ({} records)\n\n",
                i + 1,
                record.query_text(),
                record.timestamp().format("%Y-%m-%d %H:%M"),
                record.count()
            ));
        }
        Ok(Reply::Text(text.trim_end().to_string()))
    }

    fn settings_reply(&self) -> Reply {
        let settings = self.settings.read();
        Reply::Markdown(format!(
            "⚙️ *Current settings*\n\n\
             *API keys:* {}\n\
             *Admins:* {}\n\
             *Full mode:* {}\n\
             *Public mode:* {}\n\
             *Presets:* {}\n\n\
             Edit fofa.toml to change settings.",
            settings.apis().len(),
            settings.admins().len(),
            settings.full_mode(),
            settings.public_mode(),
            settings.presets().len()
        ))
    }
}

/// User-facing text for a failed command.
pub fn error_reply(err: &FofaError) -> Reply {
    let text = match err.kind() {
        FofaErrorKind::Bot(e) => match &e.kind {
            BotErrorKind::PermissionDenied(_) => {
                "⛔️ Sorry, you do not have permission to do that.".to_string()
            }
            other => format!("❌ {}", other),
        },
        FofaErrorKind::Api(e) => match &e.kind {
            FofaApiErrorKind::MissingApiKey => "❌ No FOFA API key configured".to_string(),
            other => format!("❌ Query failed: {}", other),
        },
        FofaErrorKind::Cache(e) => format!("❌ Cache error: {}", e.kind),
        FofaErrorKind::Config(e) => format!("❌ {}", e.kind),
        FofaErrorKind::NotImplemented(e) => format!("📊 {} not available yet.", e.feature),
    };
    Reply::Text(text)
}
