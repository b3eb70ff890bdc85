//! The command interpreter
//!
//! [`Cli`] owns the top-level command registry, the interpreter-wide
//! permission-group registry, and three independently ordered middleware
//! pipelines. A message flows through
//! [`tokenize`](Cli::tokenize) → [`route`](Cli::route) →
//! [`Command::execute`](crate::command::Command::execute), with middleware
//! interposed before routing, before command execution and before the
//! response is returned.
//!
//! # Example
//!
//! ```ignore
//! use vttcli_core::{Cli, Command, CommandResponse};
//!
//! let mut cli = Cli::new();
//! cli.add_command(Command::new("ping", "Respond with pong", "!ping", |_, _| {
//!     Ok(CommandResponse::new("Pong!").into())
//! })?)?;
//!
//! let reply = cli.evaluate(&message, &host);
//! ```

mod route;

use vttcli_sdk::ChatMessage;

use crate::collections::{alphabetical_by_key, Callback, KeyedList};
use crate::command::{alias_collisions, Command};
use crate::errors::{CliError, CliResult};
use crate::permissions::{GroupPredicate, GroupRegistry};
use crate::response::CommandResponse;

/// Middleware run before routing: `(tokens, message)`
pub type RoutingMiddleware = Box<dyn Fn(&[String], &ChatMessage) -> bool + Send + Sync>;

/// Middleware run after a command matched, before it executes:
/// `(command, remaining tokens, message)`
pub type CommandMiddleware =
    Box<dyn Fn(&Command, &[String], &ChatMessage) -> bool + Send + Sync>;

/// Middleware run after execution, before the response is returned:
/// `(response, message)`
pub type ResponseMiddleware = Box<dyn Fn(&CommandResponse, &ChatMessage) -> bool + Send + Sync>;

/// The top-level command router
///
/// Registries grow and shrink only through the methods here, each of which
/// re-validates the relevant uniqueness invariant before mutating. Command
/// and group registries are kept alphabetical; the middleware pipelines
/// preserve registration order, which is their execution order.
#[derive(Debug)]
pub struct Cli {
    commands: KeyedList<Command>,
    permission_groups: GroupRegistry,
    pre_routing: KeyedList<Callback<RoutingMiddleware>>,
    pre_command: KeyedList<Callback<CommandMiddleware>>,
    pre_response: KeyedList<Callback<ResponseMiddleware>>,
}

impl Cli {
    pub fn new() -> Self {
        Self {
            commands: KeyedList::sorted(alphabetical_by_key),
            permission_groups: GroupRegistry::sorted(alphabetical_by_key),
            pre_routing: KeyedList::new(),
            pre_command: KeyedList::new(),
            pre_response: KeyedList::new(),
        }
    }

    /// Top-level commands, sorted by signature
    pub fn commands(&self) -> &[Command] {
        self.commands.items()
    }

    pub fn command(&self, signature: &str) -> Option<&Command> {
        self.commands.get(signature)
    }

    pub fn command_mut(&mut self, signature: &str) -> Option<&mut Command> {
        self.commands.get_mut(signature)
    }

    /// The registry consulted by permission-group grants and tests
    pub fn permission_groups(&self) -> &GroupRegistry {
        &self.permission_groups
    }

    /// Every command in the lexicon, depth-first, parents before children
    pub fn all_commands(&self) -> Vec<&Command> {
        fn collect<'a>(acc: &mut Vec<&'a Command>, commands: &'a [Command]) {
            for command in commands {
                acc.push(command);
                collect(acc, command.subcommands());
            }
        }
        let mut all = Vec::new();
        collect(&mut all, self.commands.items());
        all
    }

    /// Register a top-level command
    ///
    /// Rejects the command when its signature or any alias collides with an
    /// existing top-level command's tokens; nothing is mutated on rejection.
    pub fn add_command(&mut self, mut command: Command) -> CliResult<&mut Self> {
        let collisions = alias_collisions(self.commands.iter(), &command);
        if !collisions.is_empty() {
            return Err(CliError::Conflict(format!(
                "The \"{}\" command collides with existing command signatures/aliases, \
                 so it cannot be added. Colliding tokens: {}",
                command.signature(),
                collisions.join(", ")
            )));
        }

        command.apply_path(Vec::new());
        let signature = command.signature().to_string();
        self.commands.add(command).map_err(|err| match err {
            CliError::Conflict(_) => CliError::Conflict(format!(
                "The \"{signature}\" command already exists, so it cannot be added."
            )),
            other => other,
        })?;
        tracing::debug!(command = %signature, "registered command");
        Ok(self)
    }

    /// Remove a top-level command (and its whole subtree) by signature
    pub fn remove_command(&mut self, signature: &str) -> CliResult<Command> {
        let removed = self.commands.remove(signature).map_err(|err| match err {
            CliError::NotFound(_) => CliError::NotFound(format!(
                "The \"{signature}\" command could not be found, so it cannot be removed."
            )),
            other => other,
        })?;
        tracing::debug!(command = %signature, "removed command");
        Ok(removed)
    }

    /// Register a named permission group
    pub fn add_permission_group<F>(&mut self, group_name: &str, predicate: F) -> CliResult<&mut Self>
    where
        F: Fn(&ChatMessage) -> bool + Send + Sync + 'static,
    {
        let callback = Callback::new(group_name, Box::new(predicate) as GroupPredicate)?;
        self.permission_groups
            .add(callback)
            .map_err(|err| match err {
                CliError::Conflict(_) => CliError::Conflict(format!(
                    "The \"{group_name}\" permission group already exists, so it cannot be added."
                )),
                other => other,
            })?;
        tracing::debug!(group = %group_name, "registered permission group");
        Ok(self)
    }

    /// Remove a permission group
    ///
    /// Fails with [`CliError::Dependency`] while any command anywhere in the
    /// tree still references the group.
    pub fn remove_permission_group(&mut self, group_name: &str) -> CliResult<&mut Self> {
        let dependents: Vec<String> = self
            .all_commands()
            .into_iter()
            .filter(|command| {
                command
                    .permissions()
                    .groups()
                    .iter()
                    .any(|name| name == group_name)
            })
            .map(|command| command.full_signature())
            .collect();
        if !dependents.is_empty() {
            return Err(CliError::Dependency(format!(
                "The \"{group_name}\" permission group cannot be removed because one or more \
                 commands depend on it. Commands: {}",
                dependents.join(", ")
            )));
        }

        self.permission_groups
            .remove(group_name)
            .map_err(|err| match err {
                CliError::NotFound(_) => CliError::NotFound(format!(
                    "The \"{group_name}\" permission group could not be found, \
                     so it cannot be removed."
                )),
                other => other,
            })?;
        tracing::debug!(group = %group_name, "removed permission group");
        Ok(self)
    }

    /// Append middleware to run before message routing
    pub fn add_pre_routing_middleware<F>(&mut self, key: &str, middleware: F) -> CliResult<&mut Self>
    where
        F: Fn(&[String], &ChatMessage) -> bool + Send + Sync + 'static,
    {
        let index = self.pre_routing.len();
        self.insert_pre_routing_middleware(index, key, middleware)
    }

    /// Splice middleware into the pre-routing pipeline at `index`
    pub fn insert_pre_routing_middleware<F>(
        &mut self,
        index: usize,
        key: &str,
        middleware: F,
    ) -> CliResult<&mut Self>
    where
        F: Fn(&[String], &ChatMessage) -> bool + Send + Sync + 'static,
    {
        let callback = Callback::new(key, Box::new(middleware) as RoutingMiddleware)?;
        insert_middleware(&mut self.pre_routing, index, callback, "pre-routing")?;
        Ok(self)
    }

    /// Remove pre-routing middleware by key
    pub fn remove_pre_routing_middleware(&mut self, key: &str) -> CliResult<&mut Self> {
        remove_middleware(&mut self.pre_routing, key, "pre-routing")?;
        Ok(self)
    }

    /// Append middleware to run between matching and execution
    pub fn add_pre_command_middleware<F>(&mut self, key: &str, middleware: F) -> CliResult<&mut Self>
    where
        F: Fn(&Command, &[String], &ChatMessage) -> bool + Send + Sync + 'static,
    {
        let index = self.pre_command.len();
        self.insert_pre_command_middleware(index, key, middleware)
    }

    /// Splice middleware into the pre-command pipeline at `index`
    pub fn insert_pre_command_middleware<F>(
        &mut self,
        index: usize,
        key: &str,
        middleware: F,
    ) -> CliResult<&mut Self>
    where
        F: Fn(&Command, &[String], &ChatMessage) -> bool + Send + Sync + 'static,
    {
        let callback = Callback::new(key, Box::new(middleware) as CommandMiddleware)?;
        insert_middleware(&mut self.pre_command, index, callback, "pre-command")?;
        Ok(self)
    }

    /// Remove pre-command middleware by key
    pub fn remove_pre_command_middleware(&mut self, key: &str) -> CliResult<&mut Self> {
        remove_middleware(&mut self.pre_command, key, "pre-command")?;
        Ok(self)
    }

    /// Append middleware to run after execution, before the response is
    /// returned
    pub fn add_pre_response_middleware<F>(
        &mut self,
        key: &str,
        middleware: F,
    ) -> CliResult<&mut Self>
    where
        F: Fn(&CommandResponse, &ChatMessage) -> bool + Send + Sync + 'static,
    {
        let index = self.pre_response.len();
        self.insert_pre_response_middleware(index, key, middleware)
    }

    /// Splice middleware into the pre-response pipeline at `index`
    pub fn insert_pre_response_middleware<F>(
        &mut self,
        index: usize,
        key: &str,
        middleware: F,
    ) -> CliResult<&mut Self>
    where
        F: Fn(&CommandResponse, &ChatMessage) -> bool + Send + Sync + 'static,
    {
        let callback = Callback::new(key, Box::new(middleware) as ResponseMiddleware)?;
        insert_middleware(&mut self.pre_response, index, callback, "pre-response")?;
        Ok(self)
    }

    /// Remove pre-response middleware by key
    pub fn remove_pre_response_middleware(&mut self, key: &str) -> CliResult<&mut Self> {
        remove_middleware(&mut self.pre_response, key, "pre-response")?;
        Ok(self)
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_middleware<F>(
    pipeline: &mut KeyedList<Callback<F>>,
    index: usize,
    callback: Callback<F>,
    stage: &str,
) -> CliResult<()> {
    let key = callback.key().to_string();
    pipeline.insert(index, callback).map_err(|err| match err {
        CliError::Conflict(_) => CliError::Conflict(format!(
            "The \"{key}\" {stage} middleware already exists, so it cannot be added."
        )),
        other => other,
    })?;
    tracing::debug!(middleware = %key, stage, "registered middleware");
    Ok(())
}

fn remove_middleware<F>(
    pipeline: &mut KeyedList<Callback<F>>,
    key: &str,
    stage: &str,
) -> CliResult<()> {
    pipeline.remove(key).map_err(|err| match err {
        CliError::NotFound(_) => CliError::NotFound(format!(
            "The \"{key}\" {stage} middleware could not be found, so it cannot be removed."
        )),
        other => other,
    })?;
    tracing::debug!(middleware = %key, stage, "removed middleware");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::CommandResponse;

    fn noop(signature: &str) -> Command {
        Command::new(signature, "", "", |_, _| {
            Ok(CommandResponse::new("ok").into())
        })
        .unwrap()
    }

    #[test]
    fn test_add_command_alias_collision_is_atomic() {
        let mut cli = Cli::new();
        let mut first = noop("initiative");
        first.add_alias("init").unwrap();
        cli.add_command(first).unwrap();

        let err = cli.add_command(noop("init")).unwrap_err();
        assert!(matches!(err, CliError::Conflict(_)));
        assert_eq!(cli.commands().len(), 1);
    }

    #[test]
    fn test_commands_sorted_by_signature() {
        let mut cli = Cli::new();
        cli.add_command(noop("perm")).unwrap();
        cli.add_command(noop("init")).unwrap();
        cli.add_command(noop("cond")).unwrap();
        let signatures: Vec<&str> = cli.commands().iter().map(|c| c.signature()).collect();
        assert_eq!(signatures, ["cond", "init", "perm"]);
    }

    #[test]
    fn test_remove_command_returns_subtree() {
        let mut cli = Cli::new();
        let mut parent = noop("init");
        parent.add_subcommand(noop("add")).unwrap();
        cli.add_command(parent).unwrap();

        let removed = cli.remove_command("init").unwrap();
        assert_eq!(removed.subcommands().len(), 1);
        assert!(cli.commands().is_empty());
        assert!(matches!(
            cli.remove_command("init"),
            Err(CliError::NotFound(_))
        ));
    }

    #[test]
    fn test_all_commands_flattens_depth_first() {
        let mut cli = Cli::new();
        let mut init = noop("init");
        init.add_subcommand(noop("add")).unwrap();
        init.add_subcommand(noop("rm")).unwrap();
        cli.add_command(init).unwrap();
        cli.add_command(noop("perm")).unwrap();

        let signatures: Vec<String> = cli
            .all_commands()
            .iter()
            .map(|c| c.full_signature())
            .collect();
        assert_eq!(signatures, ["init", "init add", "init rm", "perm"]);
    }

    #[test]
    fn test_duplicate_permission_group_conflicts() {
        let mut cli = Cli::new();
        cli.add_permission_group("helpers", |_| true).unwrap();
        let err = cli.add_permission_group("helpers", |_| false).unwrap_err();
        assert!(matches!(err, CliError::Conflict(_)));
    }

    #[test]
    fn test_remove_referenced_group_is_blocked() {
        let mut cli = Cli::new();
        cli.add_permission_group("helpers", |_| true).unwrap();

        // The reference sits on a subcommand, so the walk must recurse.
        let mut parent = noop("init");
        let mut child = noop("add");
        child
            .permissions_mut()
            .add_group("helpers", cli.permission_groups())
            .unwrap();
        parent.add_subcommand(child).unwrap();
        cli.add_command(parent).unwrap();

        let err = cli.remove_permission_group("helpers").unwrap_err();
        match err {
            CliError::Dependency(text) => assert!(text.contains("init add")),
            other => panic!("expected Dependency, got {other:?}"),
        }
        assert!(cli.permission_groups().contains_key("helpers"));

        // Dropping the dependent subtree unblocks the removal.
        cli.remove_command("init").unwrap();
        cli.remove_permission_group("helpers").unwrap();
        assert!(!cli.permission_groups().contains_key("helpers"));
    }

    #[test]
    fn test_remove_missing_group() {
        let mut cli = Cli::new();
        let err = cli.remove_permission_group("helpers").unwrap_err();
        assert!(matches!(err, CliError::NotFound(_)));
    }

    #[test]
    fn test_middleware_registry_discipline() {
        let mut cli = Cli::new();
        cli.add_pre_command_middleware("audit", |_, _, _| true)
            .unwrap();
        let err = cli
            .add_pre_command_middleware("audit", |_, _, _| true)
            .unwrap_err();
        assert!(matches!(err, CliError::Conflict(_)));

        cli.remove_pre_command_middleware("audit").unwrap();
        let err = cli.remove_pre_command_middleware("audit").unwrap_err();
        assert!(matches!(err, CliError::NotFound(_)));

        // The same key may coexist across different stages.
        cli.add_pre_routing_middleware("audit", |_, _| true).unwrap();
        cli.add_pre_response_middleware("audit", |_, _| true)
            .unwrap();
    }

    #[test]
    fn test_middleware_insert_out_of_range() {
        let mut cli = Cli::new();
        let err = cli
            .insert_pre_routing_middleware(3, "late", |_, _| true)
            .unwrap_err();
        assert!(matches!(err, CliError::Argument(_)));
    }

    #[test]
    fn test_quoted_middleware_key_rejected() {
        let mut cli = Cli::new();
        let err = cli
            .add_pre_routing_middleware("bad'key", |_, _| true)
            .unwrap_err();
        assert!(matches!(err, CliError::Argument(_)));
    }
}
