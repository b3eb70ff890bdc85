//! The collaborator surface the hosting sandbox must provide

use crate::message::PlayerId;

/// Delivery target of an outbound chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageTarget {
    /// Visible to the whole table
    All,
    /// Whispered to the game master
    Gm,
    /// Whispered to the named player
    Whisper(String),
}

/// Host environment services consumed by the interpreter
///
/// Implementations wrap the sandbox's player directory, role checks and
/// chat output. All calls are synchronous and expected to return promptly;
/// the interpreter imposes no timeout of its own.
pub trait ChatHost {
    /// Resolve a display name to a player identifier
    ///
    /// Lookup is case-insensitive. When no player matches directly,
    /// implementations fall back to resolving a character of that name to
    /// its first controlling player. Returns `None` when neither exists.
    fn resolve_player_id(&self, name: &str) -> Option<PlayerId>;

    /// Whether the given player holds the administrator (GM) role
    fn is_administrator(&self, player: &PlayerId) -> bool;

    /// Deliver an HTML-formatted chat message under the given speaker name
    fn send_message(&self, target: &MessageTarget, html_body: &str, speaker: &str);
}
