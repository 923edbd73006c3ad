//! Error for bot features that are recognised but not offered.

/// A command the bot knows about but cannot answer yet.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("{} is not available yet (/{}) at line {} in {}", feature, command, line, file)]
pub struct NotImplementedError {
    /// Feature shown to the user, e.g. "Aggregated statistics"
    pub feature: String,
    /// Command name without the leading slash
    pub command: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl NotImplementedError {
    /// Report that `command` maps to a feature that is not available.
    ///
    /// # Examples
    ///
    /// ```
    /// use fofa_error::NotImplementedError;
    ///
    /// let err = NotImplementedError::new("stats", "Aggregated statistics");
    /// assert_eq!(err.command, "stats");
    /// assert!(format!("{}", err).contains("/stats"));
    /// ```
    #[track_caller]
    pub fn new(command: impl Into<String>, feature: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            feature: feature.into(),
            command: command.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
