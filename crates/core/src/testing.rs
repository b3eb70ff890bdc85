//! Test doubles for the sandbox host
//!
//! [`MockHost`] stands in for the chat sandbox in unit tests and examples:
//! a scripted player directory, a set of administrator identifiers, and a
//! buffer capturing every outbound message.

use std::collections::HashSet;

use parking_lot::Mutex;

use vttcli_sdk::{ChatHost, MessageTarget, PlayerId};

/// One message captured by [`MockHost::send_message`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub target: MessageTarget,
    pub html: String,
    pub speaker: String,
}

/// An in-memory [`ChatHost`]
#[derive(Debug, Default)]
pub struct MockHost {
    players: Vec<(String, PlayerId)>,
    admins: HashSet<PlayerId>,
    sent: Mutex<Vec<SentMessage>>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player under a display name
    pub fn with_player(mut self, name: &str, id: &str) -> Self {
        self.players.push((name.to_string(), PlayerId::from(id)));
        self
    }

    /// Mark an identifier as holding the administrator role
    pub fn with_admin(mut self, id: &str) -> Self {
        self.admins.insert(PlayerId::from(id));
        self
    }

    /// Everything sent so far, in delivery order
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }
}

impl ChatHost for MockHost {
    fn resolve_player_id(&self, name: &str) -> Option<PlayerId> {
        self.players
            .iter()
            .find(|(player_name, _)| player_name.eq_ignore_ascii_case(name))
            .map(|(_, id)| id.clone())
    }

    fn is_administrator(&self, player: &PlayerId) -> bool {
        self.admins.contains(player)
    }

    fn send_message(&self, target: &MessageTarget, html_body: &str, speaker: &str) {
        self.sent.lock().push(SentMessage {
            target: target.clone(),
            html: html_body.to_string(),
            speaker: speaker.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_is_case_insensitive() {
        let host = MockHost::new().with_player("Alice", "p1");
        assert_eq!(host.resolve_player_id("alice"), Some(PlayerId::from("p1")));
        assert_eq!(host.resolve_player_id("ALICE"), Some(PlayerId::from("p1")));
        assert_eq!(host.resolve_player_id("Bob"), None);
    }

    #[test]
    fn test_sent_messages_captured_in_order() {
        let host = MockHost::new();
        host.send_message(&MessageTarget::Gm, "<p>one</p>", "CLI");
        host.send_message(&MessageTarget::All, "<p>two</p>", "CLI");
        let sent = host.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].target, MessageTarget::Gm);
        assert_eq!(sent[1].html, "<p>two</p>");
    }
}
