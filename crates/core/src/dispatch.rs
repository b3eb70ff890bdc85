//! Sandbox adapter
//!
//! [`Dispatcher`] wires one [`Cli`] to a concrete [`ChatHost`]: it filters
//! incoming messages for the configured trigger character, evaluates them,
//! renders the resulting responses as HTML and delivers them through the
//! host. Registration happens through [`configure`](Dispatcher::configure)
//! during startup (write lock); message handling takes a read lock, so the
//! two phases cannot overlap.

use parking_lot::RwLock;

use vttcli_sdk::{ChatHost, ChatMessage, MessageKind, MessageTarget};

use crate::cli::Cli;
use crate::config::CliConfig;
use crate::errors::CliResult;
use crate::response::{CommandResponse, Recipient};

/// Transform unescaped text into HTML-safe text, with newlines as breaks
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
        .replace('\n', "<br />")
}

/// Owns an interpreter instance and its connection to the sandbox
pub struct Dispatcher<H: ChatHost> {
    cli: RwLock<Cli>,
    host: H,
    config: CliConfig,
}

impl<H: ChatHost> Dispatcher<H> {
    pub fn new(host: H, config: CliConfig) -> Self {
        Self {
            cli: RwLock::new(Cli::new()),
            host,
            config,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Run startup registration against the interpreter
    ///
    /// Takes the write lock for the duration of `f`; not to be called while
    /// a message is being handled.
    pub fn configure<R>(&self, f: impl FnOnce(&mut Cli) -> CliResult<R>) -> CliResult<R> {
        f(&mut self.cli.write())
    }

    /// Handle one received chat message
    ///
    /// Ignores messages that are not api messages or do not start with the
    /// configured trigger character. Returns the number of responses
    /// delivered.
    pub fn handle_message(&self, message: &ChatMessage) -> usize {
        if message.kind != MessageKind::Api {
            return 0;
        }
        let Some(contents) = message.contents.strip_prefix(self.config.trigger) else {
            tracing::trace!(contents = %message.contents, "message without trigger ignored");
            return 0;
        };

        let stripped = ChatMessage {
            contents: contents.to_string(),
            ..message.clone()
        };
        let reply = self.cli.read().evaluate(&stripped, &self.host);

        let responses = reply.as_slice();
        for response in responses {
            self.send_response(response, message);
        }
        responses.len()
    }

    /// Render a response as HTML and deliver it through the host
    fn send_response(&self, response: &CommandResponse, message: &ChatMessage) {
        let target = match response.recipient() {
            Recipient::All => MessageTarget::All,
            Recipient::Gm => MessageTarget::Gm,
            Recipient::Sender => MessageTarget::Whisper(message.who.clone()),
            Recipient::Player(name) => MessageTarget::Whisper(name.clone()),
        };

        let style = if response.style().is_empty() {
            self.config.base_style.clone()
        } else {
            format!("{} {}", self.config.base_style, response.style())
        };
        let body: String = response
            .paragraphs()
            .iter()
            .map(|paragraph| format!("<p>{}</p>", escape_html(paragraph)))
            .collect();
        let html = format!("<div style=\"{style}\">{body}</div>");

        let speaker = response.speaker().unwrap_or(&self.config.speaker);
        self.host.send_message(&target, &html, speaker);
    }
}
