//! Query cache and history error types.

/// Kinds of cache errors.
///
/// `Io` and `DataCorruption` are kept apart so callers can decide whether a
/// broken history file should be fatal or reset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CacheErrorKind {
    /// Directory or file creation, read, write, rename or delete failed
    #[display("I/O error: {}", _0)]
    Io(String),
    /// History file exists but cannot be parsed
    #[display("Corrupt history data: {}", _0)]
    DataCorruption(String),
    /// History could not be serialized
    #[display("Failed to serialize history: {}", _0)]
    Serialization(String),
    /// Cache settings the manager cannot work with
    #[display("Invalid cache configuration: {}", _0)]
    InvalidConfig(String),
    /// History actor is no longer running
    #[display("History actor unavailable: {}", _0)]
    Unavailable(String),
}

/// Cache error with location tracking.
///
/// # Examples
///
/// ```
/// use fofa_error::{CacheError, CacheErrorKind};
///
/// let err = CacheError::new(CacheErrorKind::Io("fofa_cache: permission denied".to_string()));
/// assert!(format!("{}", err).contains("permission denied"));
/// assert!(err.is_io());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Cache Error: {} at line {} in {}", kind, line, file)]
pub struct CacheError {
    /// The kind of error that occurred
    pub kind: CacheErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CacheError {
    /// Create a new cache error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CacheErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// True for filesystem failures.
    pub fn is_io(&self) -> bool {
        matches!(self.kind, CacheErrorKind::Io(_))
    }

    /// True when the history file could not be parsed.
    pub fn is_corruption(&self) -> bool {
        matches!(self.kind, CacheErrorKind::DataCorruption(_))
    }
}
