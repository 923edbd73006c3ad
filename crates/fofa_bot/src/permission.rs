//! Admin allow-list and command gate.

use crate::Command;
use fofa_error::{BotError, BotErrorKind};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// Set of Telegram user ids with admin rights.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminList {
    ids: BTreeSet<u64>,
}

impl AdminList {
    /// Build from configured ids. Duplicates collapse.
    pub fn from_ids<'a>(ids: impl IntoIterator<Item = &'a u64>) -> Self {
        Self {
            ids: ids.into_iter().copied().collect(),
        }
    }

    /// Whether `user_id` is an admin.
    pub fn contains(&self, user_id: u64) -> bool {
        self.ids.contains(&user_id)
    }

    /// Number of admins.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when nobody has admin rights yet.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Decides which callers may run which commands.
///
/// `search`, `host`, `stats`, `info` and `settings` are admin-only. Public
/// mode opens `search` and `host` to everyone.
#[derive(Debug, Clone)]
pub struct CommandGate {
    admins: AdminList,
    public_mode: bool,
}

impl CommandGate {
    /// Create a gate.
    pub fn new(admins: AdminList, public_mode: bool) -> Self {
        Self {
            admins,
            public_mode,
        }
    }

    /// Whether `command` needs admin rights under the current mode.
    pub fn requires_admin(&self, command: &Command) -> bool {
        match command {
            Command::Search(_) | Command::Host(_) => !self.public_mode,
            Command::Stats(_) | Command::Info | Command::Settings => true,
            Command::Start | Command::Help | Command::History | Command::Unknown(_) => false,
        }
    }

    /// Check that `user_id` may run `command`.
    ///
    /// # Errors
    ///
    /// Returns [`BotErrorKind::PermissionDenied`] for restricted commands
    /// sent by non-admins.
    #[instrument(skip(self, command), fields(command = command.name()))]
    pub fn check(&self, command: &Command, user_id: u64) -> Result<(), BotError> {
        if self.requires_admin(command) && !self.admins.contains(user_id) {
            debug!("Command denied for non-admin");
            return Err(BotError::new(BotErrorKind::PermissionDenied(
                command.name().to_string(),
            )));
        }
        Ok(())
    }
}
