//! Per-command access control
//!
//! Each command owns a [`CommandPermissions`] whitelist of permission-group
//! names and player identifiers. The administrator role is implicitly always
//! authorized and is never stored. Group names refer into the interpreter's
//! global [`GroupRegistry`]; player names resolve through the sandbox's
//! player directory at registration time and are stored as identifiers.

use std::cmp::Ordering;

use vttcli_sdk::{ChatHost, ChatMessage, PlayerId};

use crate::collections::{alphabetical, Callback, KeyedList, UniqueList};
use crate::errors::{CliError, CliResult};

/// A predicate deciding whether a message's sender belongs to a permission
/// group
pub type GroupPredicate = Box<dyn Fn(&ChatMessage) -> bool + Send + Sync>;

/// The interpreter-wide registry of named permission groups
pub type GroupRegistry = KeyedList<Callback<GroupPredicate>>;

fn player_alphabetical(a: &PlayerId, b: &PlayerId) -> Ordering {
    alphabetical(a.as_str(), b.as_str())
}

/// Whitelist of callers allowed to execute one command
///
/// Owned by exactly one command; the command's full signature is kept here
/// for error messages only, never for traversal.
#[derive(Debug, Clone)]
pub struct CommandPermissions {
    command: String,
    groups: UniqueList<String>,
    players: UniqueList<PlayerId>,
}

impl CommandPermissions {
    pub(crate) fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            groups: UniqueList::sorted(|a: &String, b: &String| alphabetical(a, b)),
            players: UniqueList::sorted(player_alphabetical),
        }
    }

    /// Updated by the owning command whenever its position in the tree
    /// changes.
    pub(crate) fn set_command(&mut self, full_signature: String) {
        self.command = full_signature;
    }

    /// Permission-group names with access, sorted alphabetically
    pub fn groups(&self) -> &[String] {
        self.groups.items()
    }

    /// Player identifiers with access, sorted alphabetically
    pub fn players(&self) -> &[PlayerId] {
        self.players.items()
    }

    /// Grant access to an existing permission group
    ///
    /// The name must be registered in the interpreter's group registry.
    pub fn add_group(&mut self, group_name: &str, registry: &GroupRegistry) -> CliResult<&mut Self> {
        if !registry.contains_key(group_name) {
            return Err(CliError::NotFound(format!(
                "No permission group named \"{group_name}\" exists."
            )));
        }
        self.groups
            .add(group_name.to_string())
            .map_err(|err| match err {
                CliError::Conflict(_) => CliError::Conflict(format!(
                    "The \"{group_name}\" group already has permission to execute the \
                     \"{}\" command, so it cannot be added.",
                    self.command
                )),
                other => other,
            })?;
        Ok(self)
    }

    /// Revoke a permission group's access
    pub fn remove_group(&mut self, group_name: &str) -> CliResult<&mut Self> {
        self.groups
            .remove(&group_name.to_string())
            .map_err(|err| match err {
                CliError::NotFound(_) => CliError::NotFound(format!(
                    "The \"{group_name}\" group doesn't have permission to execute the \
                     \"{}\" command, so it cannot be removed.",
                    self.command
                )),
                other => other,
            })?;
        Ok(self)
    }

    /// Grant a player full-time access by display name
    ///
    /// The name resolves through the sandbox directory; the resolved
    /// identifier is what gets stored.
    pub fn add_player(&mut self, player_name: &str, host: &dyn ChatHost) -> CliResult<&mut Self> {
        let player_id = host.resolve_player_id(player_name).ok_or_else(|| {
            CliError::NotFound(format!("No player named \"{player_name}\" could be found."))
        })?;
        self.players.add(player_id).map_err(|err| match err {
            CliError::Conflict(_) => CliError::Conflict(format!(
                "{player_name} already has permission to execute the \"{}\" command, \
                 so they cannot be added.",
                self.command
            )),
            other => other,
        })?;
        Ok(self)
    }

    /// Revoke a player's access by display name
    pub fn remove_player(&mut self, player_name: &str, host: &dyn ChatHost) -> CliResult<&mut Self> {
        let player_id = host.resolve_player_id(player_name).ok_or_else(|| {
            CliError::NotFound(format!("No player named \"{player_name}\" could be found."))
        })?;
        self.players.remove(&player_id).map_err(|err| match err {
            CliError::NotFound(_) => CliError::NotFound(format!(
                "{player_name} doesn't have permission to execute the \"{}\" command, \
                 so they cannot be removed.",
                self.command
            )),
            other => other,
        })?;
        Ok(self)
    }

    /// Test a message's sender for access to the guarded command
    ///
    /// Administrator, then player whitelist, then group predicates, in that
    /// order; short-circuits on the first grant. A stored group name that no
    /// longer resolves in the registry is non-matching, not an error.
    pub fn test(
        &self,
        message: &ChatMessage,
        registry: &GroupRegistry,
        host: &dyn ChatHost,
    ) -> bool {
        if host.is_administrator(&message.player_id) {
            return true;
        }
        if self.players.contains(&message.player_id) {
            return true;
        }
        self.groups
            .iter()
            .filter_map(|name| registry.get(name))
            .any(|group| (group.func())(message))
    }
}
