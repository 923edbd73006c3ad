//! Bot configuration error types.

/// What went wrong while loading, checking or writing `fofa.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// Sources could not be merged or deserialized
    #[display("Failed to load configuration: {}", _0)]
    Load(String),
    /// A required key is empty or still holds its template placeholder
    #[display("Set a valid {} in fofa.toml or {}", key, env_var)]
    Unset {
        /// Key in `fofa.toml`
        key: &'static str,
        /// Environment variable that overrides it
        env_var: &'static str,
    },
    /// A value was parsed but cannot be used
    #[display("Invalid configuration: {}", _0)]
    Invalid(String),
    /// The configuration could not be serialized or written to disk
    #[display("Failed to save configuration: {}", _0)]
    Save(String),
    /// Refused to replace an existing configuration file
    #[display("{} already exists, use --force to overwrite", _0)]
    AlreadyExists(String),
}

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use fofa_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::Unset {
///     key: "bot_token",
///     env_var: "FOFA__BOT_TOKEN",
/// });
/// assert!(err.is_unset());
/// assert!(format!("{}", err).contains("FOFA__BOT_TOKEN"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// The kind of error that occurred
    pub kind: ConfigErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new configuration error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// True when a required key still needs a value.
    pub fn is_unset(&self) -> bool {
        matches!(self.kind, ConfigErrorKind::Unset { .. })
    }
}
