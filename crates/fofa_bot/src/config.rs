//! Bot configuration.
//!
//! Configuration is layered with the `config` crate:
//! 1. Bundled defaults (include_str! from fofa.toml)
//! 2. User override file (./fofa.toml, or an explicit path)
//! 3. Environment variables prefixed `FOFA__` (e.g. `FOFA__BOT_TOKEN`)

use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use fofa_cache::CacheConfig;
use fofa_error::{ConfigError, ConfigErrorKind, FofaResult};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Bundled default configuration.
pub const DEFAULT_CONFIG: &str = include_str!("../../../fofa.toml");

/// Name of the user override file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "fofa.toml";

const CONFIG_BASENAME: &str = "fofa";

const TOKEN_PLACEHOLDER: &str = "YOUR_BOT_TOKEN_HERE";
const API_KEY_PLACEHOLDER: &str = "YOUR_FOFA_API_KEY_HERE";

/// A named query shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Preset {
    /// Display name
    name: String,
    /// FOFA query expression
    query: String,
}

/// Full bot configuration.
#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_", into)]
pub struct BotConfig {
    /// Telegram bot token
    #[serde(default)]
    bot_token: String,

    /// FOFA API keys, the first is used
    #[serde(default)]
    apis: Vec<String>,

    /// Telegram user ids with admin rights
    #[serde(default)]
    admins: Vec<u64>,

    /// Proxy URL for outgoing requests, empty for none
    #[serde(default)]
    proxy: String,

    /// Search all historical data
    #[serde(default)]
    full_mode: bool,

    /// Open /search and /host to non-admins
    #[serde(default)]
    public_mode: bool,

    /// Self-update source, unused by the bot itself
    #[serde(default)]
    update_url: String,

    /// Query shortcuts
    #[serde(default)]
    presets: Vec<Preset>,

    /// Query cache settings
    #[serde(default)]
    cache: CacheConfig,
}

impl BotConfig {
    /// Load configuration: bundled defaults, then ./fofa.toml if present,
    /// then `FOFA__*` environment variables.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use fofa_bot::BotConfig;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = BotConfig::load()?;
    /// println!("{} admins", config.admins().len());
    /// # Ok(())
    /// # }
    /// ```
    #[instrument]
    pub fn load() -> FofaResult<Self> {
        debug!("Loading configuration with precedence: env > ./fofa.toml > bundled defaults");
        Self::build(File::with_name(CONFIG_BASENAME).required(false))
    }

    /// Load configuration with an explicit override file, which must exist.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> FofaResult<Self> {
        debug!("Loading configuration from file");
        Self::build(File::from(path.as_ref()).format(FileFormat::Toml))
    }

    fn build<S>(user: S) -> FofaResult<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config: Self = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(user)
            .add_source(
                Environment::with_prefix("FOFA")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("apis")
                    .with_list_parse_key("admins")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Load(e.to_string())))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Load(e.to_string())))?;

        config
            .cache
            .validate()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Invalid(e)))?;
        Ok(config)
    }

    /// Parse a TOML document on its own, without defaults or environment.
    pub fn from_toml_str(content: &str) -> FofaResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(ConfigErrorKind::Load(e.to_string())))?;
        Ok(config)
    }

    /// Configuration written by `fofa init`: placeholders the user must edit.
    pub fn template() -> Self {
        Self {
            bot_token: TOKEN_PLACEHOLDER.to_string(),
            apis: vec![API_KEY_PLACEHOLDER.to_string()],
            ..Self::default()
        }
    }

    /// Write the configuration as TOML, replacing `path` atomically.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> FofaResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::new(ConfigErrorKind::Save(e.to_string())))?;

        let temp_path = path.with_file_name(format!(
            ".{}.{}.tmp",
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| CONFIG_FILE_NAME.to_string()),
            uuid::Uuid::new_v4().simple()
        ));

        let write = || -> std::io::Result<()> {
            let mut file = std::fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
            std::fs::rename(&temp_path, path)
        };

        write().map_err(|e| {
            let _ = std::fs::remove_file(&temp_path);
            ConfigError::new(ConfigErrorKind::Save(format!("{}: {}", path.display(), e)))
        })?;

        info!("Saved configuration");
        Ok(())
    }

    /// Reject configurations the bot cannot start with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the bot token or the first API key is
    /// missing or still a placeholder.
    pub fn validate(&self) -> FofaResult<()> {
        let token = self.bot_token.trim();
        if token.is_empty() || token == TOKEN_PLACEHOLDER {
            return Err(ConfigError::new(ConfigErrorKind::Unset {
                key: "bot_token",
                env_var: "FOFA__BOT_TOKEN",
            })
            .into());
        }
        if self.api_key().is_none() {
            return Err(ConfigError::new(ConfigErrorKind::Unset {
                key: "apis",
                env_var: "FOFA__APIS",
            })
            .into());
        }
        self.cache
            .validate()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Invalid(e)))?;
        Ok(())
    }

    /// The API key used for searches, if one is configured.
    pub fn api_key(&self) -> Option<&str> {
        self.apis
            .first()
            .map(|key| key.trim())
            .filter(|key| !key.is_empty() && *key != API_KEY_PLACEHOLDER)
    }

    /// Proxy URL, `None` when unset.
    pub fn proxy_url(&self) -> Option<&str> {
        Some(self.proxy.trim()).filter(|p| !p.is_empty())
    }

    /// Register `user_id` as an admin. Returns false if already present.
    pub fn add_admin(&mut self, user_id: u64) -> bool {
        if self.admins.contains(&user_id) {
            return false;
        }
        self.admins.push(user_id);
        true
    }
}
