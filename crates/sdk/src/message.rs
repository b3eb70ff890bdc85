//! Chat message types as delivered by the sandbox

use std::fmt;

/// Kind of a chat message, mirroring the sandbox's message taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Ordinary table chat
    General,
    /// A scripting command addressed to installed scripts
    Api,
    /// A private message between two players
    Whisper,
    /// An emote ("/me ...") message
    Emote,
}

impl MessageKind {
    /// Returns true if this message is addressed to installed scripts
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api)
    }
}

/// Opaque identifier of a player within the sandbox
///
/// The sandbox assigns these; the interpreter only ever compares and
/// displays them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A single chat message received from the sandbox
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// Kind of message
    pub kind: MessageKind,
    /// Raw text contents, including any command trigger prefix
    pub contents: String,
    /// Identifier of the sending player
    pub player_id: PlayerId,
    /// Display name the message was sent as
    pub who: String,
}

impl ChatMessage {
    /// Create a scripting-command message
    pub fn api(contents: impl Into<String>, player_id: PlayerId, who: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Api,
            contents: contents.into(),
            player_id,
            who: who.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_constructor() {
        let msg = ChatMessage::api("!ping", PlayerId::from("p1"), "Alice");
        assert!(msg.kind.is_api());
        assert_eq!(msg.contents, "!ping");
        assert_eq!(msg.who, "Alice");
    }

    #[test]
    fn test_player_id_ordering() {
        let a = PlayerId::from("a");
        let b = PlayerId::from("b");
        assert!(a < b);
        assert_eq!(a, PlayerId::new("a"));
    }
}
