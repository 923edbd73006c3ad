//! Chat command parsing.

/// A parsed bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start`: greeting, first-admin registration
    Start,
    /// `/help`: command manual
    Help,
    /// `/search <query>`
    Search(String),
    /// `/host <ip|domain>`
    Host(String),
    /// `/stats <query>`
    Stats(String),
    /// `/info`: account details of the configured key
    Info,
    /// `/history`: recent queries
    History,
    /// `/settings`: current configuration summary
    Settings,
    /// Any other `/name`
    Unknown(String),
}

impl Command {
    /// Parse a message text of the form `/name[@bot] args`.
    ///
    /// Returns `None` for text that is not a command. Command names are
    /// matched case-insensitively; arguments are trimmed but otherwise kept
    /// as typed.
    ///
    /// ```
    /// use fofa_bot::Command;
    ///
    /// assert_eq!(
    ///     Command::parse("/search@fofa_bot  domain=\"example.com\" "),
    ///     Some(Command::Search("domain=\"example.com\"".to_string()))
    /// );
    /// assert_eq!(Command::parse("hello"), None);
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim_start();
        let rest = text.strip_prefix('/')?;

        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or_default();
        if name.is_empty() {
            return None;
        }

        let args = args.to_string();
        Some(match name.to_ascii_lowercase().as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "search" => Command::Search(args),
            "host" => Command::Host(args),
            "stats" => Command::Stats(args),
            "info" => Command::Info,
            "history" => Command::History,
            "settings" => Command::Settings,
            _ => Command::Unknown(name.to_string()),
        })
    }

    /// Command name without the leading slash.
    pub fn name(&self) -> &str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Search(_) => "search",
            Command::Host(_) => "host",
            Command::Stats(_) => "stats",
            Command::Info => "info",
            Command::History => "history",
            Command::Settings => "settings",
            Command::Unknown(name) => name,
        }
    }

    /// Commands that call the remote service and may take a while.
    pub fn is_slow(&self) -> bool {
        matches!(
            self,
            Command::Search(_) | Command::Host(_) | Command::Info
        )
    }

    /// Commands the Telegram menu advertises, with descriptions.
    pub fn menu() -> &'static [(&'static str, &'static str)] {
        &[
            ("start", "🚀 Start the bot"),
            ("help", "❓ Command manual"),
            ("search", "🔍 FOFA search"),
            ("host", "📦 Host lookup"),
            ("stats", "📊 Aggregated statistics"),
            ("info", "👤 Account info"),
            ("history", "🕰️ Query history"),
            ("settings", "⚙️ Settings"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/HELP"), Some(Command::Help));
        assert_eq!(Command::parse("/history extra"), Some(Command::History));
        assert_eq!(Command::parse("/settings@my_bot"), Some(Command::Settings));
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(
            Command::parse("/host 1.1.1.1"),
            Some(Command::Host("1.1.1.1".to_string()))
        );
        assert_eq!(
            Command::parse("/search\ttitle=\"a b\"  &&  port=\"80\""),
            Some(Command::Search("title=\"a b\"  &&  port=\"80\"".to_string()))
        );
        assert_eq!(Command::parse("/search"), Some(Command::Search(String::new())));
    }

    #[test]
    fn test_parse_non_commands() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("search x"), None);
        assert_eq!(Command::parse("/"), None);
        assert_eq!(Command::parse("/@bot"), None);
    }

    #[test]
    fn test_unknown_command_keeps_name() {
        let command = Command::parse("/Reboot now").unwrap();
        assert_eq!(command, Command::Unknown("Reboot".to_string()));
        assert_eq!(command.name(), "Reboot");
    }
}
