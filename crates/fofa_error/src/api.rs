//! FOFA API error types.

/// FOFA API error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum FofaApiErrorKind {
    /// No API key configured
    #[display("No FOFA API key configured")]
    MissingApiKey,
    /// Failed to build the HTTP client
    #[display("Failed to create FOFA client: {}", _0)]
    ClientCreation(String),
    /// Request never produced a response (DNS, connect, timeout)
    #[display("FOFA request failed: {}", _0)]
    Transport(String),
    /// Non-success HTTP status
    #[display("HTTP {} error: {}", status_code, message)]
    Status {
        /// HTTP status code
        status_code: u16,
        /// Response body or reason
        message: String,
    },
    /// Response body was not the expected JSON
    #[display("Failed to decode FOFA response: {}", _0)]
    Decode(String),
    /// The API answered with `error: true`
    #[display("FOFA API error: {}", _0)]
    Api(String),
}

impl FofaApiErrorKind {
    /// True when the remote service itself rejected the request
    /// (invalid key, quota exceeded, bad query).
    pub fn is_remote_rejection(&self) -> bool {
        matches!(self, FofaApiErrorKind::Api(_))
    }

    /// True for timeouts reported by the transport.
    pub fn is_timeout(&self) -> bool {
        match self {
            FofaApiErrorKind::Transport(message) => message.contains("timed out"),
            _ => false,
        }
    }
}

/// FOFA API error with source location tracking.
///
/// # Examples
///
/// ```
/// use fofa_error::{FofaApiError, FofaApiErrorKind};
///
/// let err = FofaApiError::new(FofaApiErrorKind::Api("[-700] Account Invalid".to_string()));
/// assert!(format!("{}", err).contains("Account Invalid"));
/// assert!(err.kind.is_remote_rejection());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("FOFA API Error: {} at line {} in {}", kind, line, file)]
pub struct FofaApiError {
    /// The kind of error that occurred
    pub kind: FofaApiErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl FofaApiError {
    /// Create a new FofaApiError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: FofaApiErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
