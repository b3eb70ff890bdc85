//! Command tree nodes

use vttcli_sdk::{ChatHost, ChatMessage};

use crate::collections::{alphabetical, alphabetical_by_key, Keyed, KeyedList, UniqueList};
use crate::errors::{CliError, CliResult};
use crate::permissions::{CommandPermissions, GroupRegistry};
use crate::response::CommandReply;

/// Handler invoked when a command is matched and permitted
///
/// Receives the tokens remaining after the command chain was consumed, plus
/// the originating message.
pub type CommandCallback =
    Box<dyn Fn(&[String], &ChatMessage) -> CliResult<CommandReply> + Send + Sync>;

/// A node in the command tree
///
/// The signature is the canonical token invoking the command; aliases are
/// alternate tokens. Within one parent's subcommand set the union of every
/// sibling's aliases and signatures is pairwise disjoint, enforced when a
/// subcommand is attached. The chain of ancestor signatures is carried on
/// each node and refreshed on attachment, so the full signature is always
/// derivable without a parent pointer.
pub struct Command {
    signature: String,
    description: String,
    syntax: String,
    callback: CommandCallback,
    aliases: UniqueList<String>,
    permissions: CommandPermissions,
    path: Vec<String>,
    subcommands: KeyedList<Command>,
}

impl Keyed for Command {
    fn key(&self) -> &str {
        &self.signature
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("signature", &self.signature)
            .field("description", &self.description)
            .field("syntax", &self.syntax)
            .field("callback", &format_args!("<fn>"))
            .field("aliases", &self.aliases)
            .field("permissions", &self.permissions)
            .field("path", &self.path)
            .field("subcommands", &self.subcommands)
            .finish()
    }
}

/// Signatures and aliases must tokenize as a single bare word
fn validate_token(token: &str, what: &str) -> CliResult<()> {
    if token.is_empty() {
        return Err(CliError::Argument(format!(
            "{what} must be a non-empty string"
        )));
    }
    if token.chars().any(char::is_whitespace) {
        return Err(CliError::Argument(format!(
            "{what} must not contain whitespace"
        )));
    }
    if token.contains(['\'', '"']) {
        return Err(CliError::Argument(format!(
            "{what} must not contain any single-quotes or double-quotes"
        )));
    }
    Ok(())
}

/// Tokens of `child` that collide with any existing sibling's aliases,
/// sorted alphabetically. Shared by subcommand and top-level registration.
pub(crate) fn alias_collisions<'a>(
    siblings: impl Iterator<Item = &'a Command>,
    child: &Command,
) -> Vec<String> {
    let child_aliases = child.all_aliases();
    let mut collisions: Vec<String> = siblings
        .flat_map(|sibling| sibling.all_aliases())
        .filter(|token| child_aliases.contains(token))
        .collect();
    collisions.sort_by(|a, b| alphabetical(a, b));
    collisions.dedup();
    collisions
}

impl Command {
    /// Create a detached command
    ///
    /// The signature must be non-empty and free of whitespace and quote
    /// characters.
    pub fn new<F>(
        signature: impl Into<String>,
        description: impl Into<String>,
        syntax: impl Into<String>,
        callback: F,
    ) -> CliResult<Self>
    where
        F: Fn(&[String], &ChatMessage) -> CliResult<CommandReply> + Send + Sync + 'static,
    {
        let signature = signature.into();
        validate_token(&signature, "signature")?;
        Ok(Self {
            permissions: CommandPermissions::new(signature.clone()),
            signature,
            description: description.into(),
            syntax: syntax.into(),
            callback: Box::new(callback),
            aliases: UniqueList::sorted(|a: &String, b: &String| alphabetical(a, b)),
            path: Vec::new(),
            subcommands: KeyedList::sorted(alphabetical_by_key),
        })
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Help text describing how to invoke the command
    pub fn syntax(&self) -> &str {
        &self.syntax
    }

    /// Alternate tokens, sorted alphabetically
    pub fn aliases(&self) -> &[String] {
        self.aliases.items()
    }

    pub fn permissions(&self) -> &CommandPermissions {
        &self.permissions
    }

    pub fn permissions_mut(&mut self) -> &mut CommandPermissions {
        &mut self.permissions
    }

    /// Child commands, sorted by signature
    pub fn subcommands(&self) -> &[Command] {
        self.subcommands.items()
    }

    pub fn subcommand(&self, signature: &str) -> Option<&Command> {
        self.subcommands.get(signature)
    }

    /// Every token this command answers to: aliases plus the signature,
    /// sorted alphabetically
    pub fn all_aliases(&self) -> Vec<String> {
        let mut all = self.aliases.items().to_vec();
        all.push(self.signature.clone());
        all.sort_by(|a, b| alphabetical(a, b));
        all
    }

    /// Whether `token` invokes this command
    pub fn matches(&self, token: &str) -> bool {
        self.signature == token || self.aliases.contains(&token.to_string())
    }

    /// Signature chain from the tree root down to this command
    pub fn full_signature_tokens(&self) -> Vec<String> {
        let mut tokens = self.path.clone();
        tokens.push(self.signature.clone());
        tokens
    }

    /// The signature chain joined by spaces
    pub fn full_signature(&self) -> String {
        self.full_signature_tokens().join(" ")
    }

    /// Add an alternate token invoking this command
    pub fn add_alias(&mut self, alias: &str) -> CliResult<&mut Self> {
        validate_token(alias, "alias")?;
        self.aliases
            .add(alias.to_string())
            .map_err(|err| match err {
                CliError::Conflict(_) => CliError::Conflict(format!(
                    "The \"{alias}\" alias already exists, so it cannot be added."
                )),
                other => other,
            })?;
        Ok(self)
    }

    /// Remove an alternate token
    pub fn remove_alias(&mut self, alias: &str) -> CliResult<&mut Self> {
        self.aliases
            .remove(&alias.to_string())
            .map_err(|err| match err {
                CliError::NotFound(_) => CliError::NotFound(format!(
                    "The \"{alias}\" alias could not be found, so it cannot be removed."
                )),
                other => other,
            })?;
        Ok(self)
    }

    /// Attach a subcommand
    ///
    /// Rejects the child when its signature or any alias collides with any
    /// existing sibling's tokens; nothing is mutated on rejection. On
    /// success the child subtree's ancestor paths are refreshed.
    pub fn add_subcommand(&mut self, mut child: Command) -> CliResult<&mut Self> {
        let collisions = alias_collisions(self.subcommands.iter(), &child);
        if !collisions.is_empty() {
            return Err(CliError::Conflict(format!(
                "The \"{}\" subcommand collides with existing command signatures/aliases, \
                 so it cannot be added. Colliding tokens: {}",
                child.signature,
                collisions.join(", ")
            )));
        }

        child.apply_path(self.full_signature_tokens());
        let child_signature = child.signature.clone();
        self.subcommands.add(child).map_err(|err| match err {
            CliError::Conflict(_) => CliError::Conflict(format!(
                "The \"{child_signature}\" subcommand already exists, so it cannot be added."
            )),
            other => other,
        })?;
        tracing::debug!(
            parent = %self.full_signature(),
            subcommand = %child_signature,
            "attached subcommand"
        );
        Ok(self)
    }

    /// Detach a subcommand (and its whole subtree) by signature
    pub fn remove_subcommand(&mut self, signature: &str) -> CliResult<Command> {
        self.subcommands.remove(signature).map_err(|err| match err {
            CliError::NotFound(_) => CliError::NotFound(format!(
                "The \"{signature}\" subcommand could not be found, so it cannot be removed."
            )),
            other => other,
        })
    }

    /// Refresh the ancestor path of this node and every descendant
    pub(crate) fn apply_path(&mut self, path: Vec<String>) {
        self.path = path;
        self.permissions.set_command(self.full_signature());
        let child_path = self.full_signature_tokens();
        for child in self.subcommands.iter_mut() {
            child.apply_path(child_path.clone());
        }
    }

    /// Check permissions, then run the callback
    ///
    /// A refused permission test fails with [`CliError::Command`]; the
    /// callback's result is returned unchanged otherwise.
    pub fn execute(
        &self,
        args: &[String],
        message: &ChatMessage,
        registry: &GroupRegistry,
        host: &dyn ChatHost,
    ) -> CliResult<CommandReply> {
        if !self.permissions.test(message, registry, host) {
            return Err(CliError::Command(
                "You do not have permission to execute the requested command.".to_string(),
            ));
        }
        (self.callback)(args, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::CommandResponse;
    use crate::testing::MockHost;
    use vttcli_sdk::PlayerId;

    fn noop(signature: &str) -> Command {
        Command::new(signature, "", "", |_, _| {
            Ok(CommandResponse::new("ok").into())
        })
        .unwrap()
    }

    fn message() -> ChatMessage {
        ChatMessage::api("hello", PlayerId::from("p1"), "Alice")
    }

    #[test]
    fn test_signature_validation() {
        assert!(matches!(
            Command::new("", "", "", |_, _| Ok(CommandResponse::new("x").into())),
            Err(CliError::Argument(_))
        ));
        assert!(matches!(
            Command::new("two words", "", "", |_, _| Ok(CommandResponse::new("x").into())),
            Err(CliError::Argument(_))
        ));
        assert!(matches!(
            Command::new("it's", "", "", |_, _| Ok(CommandResponse::new("x").into())),
            Err(CliError::Argument(_))
        ));
    }

    #[test]
    fn test_alias_validation_and_conflicts() {
        let mut cmd = noop("roster");
        cmd.add_alias("rs").unwrap();
        assert!(matches!(
            cmd.add_alias("has space"),
            Err(CliError::Argument(_))
        ));
        assert!(matches!(cmd.add_alias("rs"), Err(CliError::Conflict(_))));
        assert!(matches!(
            cmd.remove_alias("zz"),
            Err(CliError::NotFound(_))
        ));
    }

    #[test]
    fn test_all_aliases_includes_signature_sorted() {
        let mut cmd = noop("roster");
        cmd.add_alias("rs").unwrap().add_alias("list").unwrap();
        assert_eq!(cmd.all_aliases(), ["list", "roster", "rs"]);
        assert!(cmd.matches("roster"));
        assert!(cmd.matches("rs"));
        assert!(!cmd.matches("other"));
    }

    #[test]
    fn test_full_signature_after_nested_attach() {
        let mut grandchild = noop("leaf");
        grandchild.add_subcommand(noop("deeper")).unwrap();
        let mut child = noop("branch");
        child.add_subcommand(grandchild).unwrap();
        let mut root = noop("tree");
        root.add_subcommand(child).unwrap();

        let branch = root.subcommand("branch").unwrap();
        assert_eq!(branch.full_signature(), "tree branch");
        let leaf = branch.subcommand("leaf").unwrap();
        assert_eq!(leaf.full_signature(), "tree branch leaf");
        assert_eq!(
            leaf.subcommand("deeper").unwrap().full_signature_tokens(),
            ["tree", "branch", "leaf", "deeper"]
        );
    }

    #[test]
    fn test_subcommand_alias_collision_is_atomic() {
        let mut root = noop("tree");
        let mut first = noop("branch");
        first.add_alias("br").unwrap();
        root.add_subcommand(first).unwrap();

        // Signature of the new child collides with an existing alias.
        let err = root.add_subcommand(noop("br")).unwrap_err();
        assert!(matches!(err, CliError::Conflict(_)));
        assert_eq!(root.subcommands().len(), 1);

        // Alias of the new child collides with an existing signature.
        let mut second = noop("other");
        second.add_alias("branch").unwrap();
        let err = root.add_subcommand(second).unwrap_err();
        match err {
            CliError::Conflict(text) => assert!(text.contains("branch")),
            other => panic!("expected Conflict, got {other:?}"),
        }
        assert_eq!(root.subcommands().len(), 1);
    }

    #[test]
    fn test_remove_subcommand_returns_subtree() {
        let mut root = noop("tree");
        root.add_subcommand(noop("branch")).unwrap();
        let removed = root.remove_subcommand("branch").unwrap();
        assert_eq!(removed.signature(), "branch");
        assert!(root.subcommands().is_empty());
        assert!(matches!(
            root.remove_subcommand("branch"),
            Err(CliError::NotFound(_))
        ));
    }

    #[test]
    fn test_execute_checks_permissions_first() {
        let host = MockHost::new();
        let registry = GroupRegistry::new();
        let cmd = noop("roster");
        let err = cmd
            .execute(&[], &message(), &registry, &host)
            .unwrap_err();
        assert!(matches!(err, CliError::Command(_)));
    }

    #[test]
    fn test_execute_passes_args_through() {
        let host = MockHost::new().with_admin("p1");
        let registry = GroupRegistry::new();
        let cmd = Command::new("echo", "", "", |args: &[String], _: &ChatMessage| {
            Ok(CommandResponse::new(args.join("|")).into())
        })
        .unwrap();
        let args = vec!["a".to_string(), "b c".to_string()];
        let reply = cmd.execute(&args, &message(), &registry, &host).unwrap();
        assert_eq!(reply.as_slice()[0].paragraphs(), ["a|b c"]);
    }
}
