//! Tokenizing, routing and evaluating chat messages

use vttcli_sdk::{ChatHost, ChatMessage, MessageKind};

use super::Cli;
use crate::command::Command;
use crate::errors::{CliError, CliResult};
use crate::response::{CommandReply, CommandResponse};

/// Shown to the sender when evaluation fails for any non-command reason
const UNEXPECTED_ERROR_TEXT: &str = "An unexpected error occurred! See the script execution log.";

impl Cli {
    /// Split message contents into command and argument tokens
    ///
    /// Unquoted runs split on whitespace. `'...'` and `"..."` spans keep
    /// their interior whitespace and lose exactly one layer of surrounding
    /// quotes; quotes are not un-escaped inside a span. An unmatched quote
    /// character is dropped and scanning continues after it. Blank input
    /// yields no tokens.
    pub fn tokenize(contents: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut i = 0;
        while let Some(c) = contents[i..].chars().next() {
            let width = c.len_utf8();
            match c {
                c if c.is_whitespace() => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                    i += width;
                }
                '\'' | '"' => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                    let span_start = i + width;
                    match contents[span_start..].find(c) {
                        Some(offset) => {
                            tokens.push(contents[span_start..span_start + offset].to_string());
                            i = span_start + offset + width;
                        }
                        None => {
                            // Unmatched quote: skip the character itself.
                            i += width;
                        }
                    }
                }
                _ => {
                    current.push(c);
                    i += width;
                }
            }
        }
        if !current.is_empty() {
            tokens.push(current);
        }
        tokens
    }

    /// Match tokens against the command tree and execute the target
    ///
    /// Stages, in order: pre-routing middleware, tree match, pre-command
    /// middleware, execution, pre-response middleware. Each middleware stage
    /// is a short-circuit AND: the first `false` vetoes continuation and no
    /// later middleware in that stage runs.
    pub fn route(
        &self,
        tokens: &[String],
        message: &ChatMessage,
        host: &dyn ChatHost,
    ) -> CliResult<CommandReply> {
        for middleware in self.pre_routing.iter() {
            if !(middleware.func())(tokens, message) {
                tracing::trace!(middleware = %middleware.key(), "pre-routing veto");
                return Err(CliError::Aborted("message routing"));
            }
        }

        let (command, args) = self.match_tokens(tokens)?;
        tracing::trace!(command = %command.full_signature(), args = args.len(), "matched command");

        for middleware in self.pre_command.iter() {
            if !(middleware.func())(command, args, message) {
                tracing::trace!(middleware = %middleware.key(), "pre-command veto");
                return Err(CliError::Aborted("command execution"));
            }
        }

        let reply = command.execute(args, message, &self.permission_groups, host)?;

        for middleware in self.pre_response.iter() {
            for response in reply.as_slice() {
                if !(middleware.func())(response, message) {
                    tracing::trace!(middleware = %middleware.key(), "pre-response veto");
                    return Err(CliError::Aborted("response"));
                }
            }
        }

        Ok(reply)
    }

    /// Descend the command tree as far as the tokens allow
    ///
    /// A child matches when the next token equals any of its aliases or its
    /// signature. The last matched command is the target; the tokens left
    /// over are its arguments.
    fn match_tokens<'a, 'b>(
        &'a self,
        tokens: &'b [String],
    ) -> CliResult<(&'a Command, &'b [String])> {
        let first = tokens
            .first()
            .ok_or_else(|| CliError::NotFound("Command not found.".to_string()))?;
        let mut command = self
            .commands
            .iter()
            .find(|c| c.matches(first))
            .ok_or_else(|| CliError::NotFound("Command not found.".to_string()))?;

        let mut consumed = 1;
        while let Some(token) = tokens.get(consumed) {
            match command.subcommands().iter().find(|c| c.matches(token)) {
                Some(child) => {
                    command = child;
                    consumed += 1;
                }
                None => break,
            }
        }
        Ok((command, &tokens[consumed..]))
    }

    /// Evaluate one received chat message end to end
    ///
    /// Never fails: an expected command failure is whispered back to the
    /// sender verbatim, anything else is logged and replaced with an opaque
    /// failure notice. Message contents are tokenized as-is; any command
    /// trigger prefix is the adapter's concern.
    pub fn evaluate(&self, message: &ChatMessage, host: &dyn ChatHost) -> CommandReply {
        if message.kind != MessageKind::Api {
            tracing::warn!(kind = ?message.kind, "evaluate called with a non-api message");
            return CommandResponse::new(UNEXPECTED_ERROR_TEXT).into();
        }

        let tokens = Self::tokenize(&message.contents);
        match self.route(&tokens, message, host) {
            Ok(reply) => reply,
            Err(CliError::Command(text)) => CommandResponse::new(text).into(),
            Err(err) => {
                tracing::error!(error = %err, contents = %message.contents, "evaluation failed");
                CommandResponse::new(UNEXPECTED_ERROR_TEXT).into()
            }
        }
    }
}
