//! Top-level error wrapper types.

use crate::{BotError, CacheError, ConfigError, FofaApiError, NotImplementedError};

/// Every error a FOFA bot operation can produce.
///
/// # Examples
///
/// ```
/// use fofa_error::{FofaError, FofaErrorKind, ConfigError, ConfigErrorKind};
///
/// let err: FofaError = ConfigError::new(ConfigErrorKind::Invalid("apis is empty".into())).into();
/// assert!(matches!(err.kind(), FofaErrorKind::Config(_)));
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum FofaErrorKind {
    /// Query cache / history error
    #[from(CacheError)]
    Cache(CacheError),
    /// Remote search API error
    #[from(FofaApiError)]
    Api(FofaApiError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Chat transport or dispatcher error
    #[from(BotError)]
    Bot(BotError),
    /// Command recognised but not offered
    #[from(NotImplementedError)]
    NotImplemented(NotImplementedError),
}

/// FOFA bot error with kind discrimination.
///
/// # Examples
///
/// ```
/// use fofa_error::{FofaResult, FofaApiError, FofaApiErrorKind};
///
/// fn search() -> FofaResult<()> {
///     Err(FofaApiError::new(FofaApiErrorKind::MissingApiKey))?
/// }
///
/// assert!(search().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("FOFA Bot Error: {}", _0)]
pub struct FofaError(Box<FofaErrorKind>);

impl FofaError {
    /// Create a new error from a kind.
    pub fn new(kind: FofaErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &FofaErrorKind {
        &self.0
    }

    /// The cache error, if this is one.
    pub fn as_cache(&self) -> Option<&CacheError> {
        match self.kind() {
            FofaErrorKind::Cache(e) => Some(e),
            _ => None,
        }
    }

    /// The API error, if this is one.
    pub fn as_api(&self) -> Option<&FofaApiError> {
        match self.kind() {
            FofaErrorKind::Api(e) => Some(e),
            _ => None,
        }
    }
}

// Generic From implementation for any type that converts to FofaErrorKind
impl<T> From<T> for FofaError
where
    T: Into<FofaErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for FOFA bot operations.
pub type FofaResult<T> = std::result::Result<T, FofaError>;
