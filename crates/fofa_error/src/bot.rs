//! Chat transport and dispatcher error types.

/// Error kinds for bot operations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum BotErrorKind {
    /// Caller is not allowed to run the command
    #[display("Permission denied for command '{}'", _0)]
    PermissionDenied(String),

    /// Bot token rejected or connection failed
    #[display("Connection failed: {}", _0)]
    ConnectionFailed(String),

    /// Sending a reply failed
    #[display("Failed to send reply: {}", _0)]
    Send(String),

    /// Result file could not be written
    #[display("Failed to write results: {}", _0)]
    ResultWrite(String),
}

/// Error wrapper with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Bot Error: {} at line {} in {}", kind, line, file)]
pub struct BotError {
    /// The error kind
    pub kind: BotErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl BotError {
    /// Create a new BotError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: BotErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
