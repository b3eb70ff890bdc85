//! VTTCLI - Chat Command Interpreter Core
//!
//! This crate contains the command interpreter for a virtual-tabletop chat
//! sandbox: a registry of commands arranged in a tree, per-command access
//! control, three middleware pipelines, and the tokenizer/router that turns
//! a received chat message into executed handlers and structured responses.
//!
//! # Architecture
//!
//! ```text
//! chat message → Dispatcher (trigger check)
//!              → Cli::evaluate
//!                  → tokenize
//!                  → route: pre-routing middleware → tree match
//!                         → pre-command middleware → Command::execute
//!                         → pre-response middleware
//!              → Dispatcher (HTML rendering) → ChatHost::send_message
//! ```
//!
//! The hosting sandbox is consumed only through the [`vttcli_sdk::ChatHost`]
//! trait; everything here is synchronous and single-threaded per message.
//!
//! # Example
//!
//! ```ignore
//! use vttcli_core::{Cli, CliConfig, Command, CommandResponse, Dispatcher};
//!
//! let dispatcher = Dispatcher::new(host, CliConfig::default());
//! dispatcher.configure(|cli| {
//!     cli.add_permission_group("helpers", |msg| is_helper(msg))?;
//!     let mut roster = Command::new("roster", "Show the roster", "!roster", |_, _| {
//!         Ok(CommandResponse::new("...").into())
//!     })?;
//!     roster.permissions_mut().add_group("helpers", cli.permission_groups())?;
//!     cli.add_command(roster)?;
//!     Ok(())
//! })?;
//!
//! // For every received chat message:
//! dispatcher.handle_message(&message);
//! ```

// Re-export the SDK crate for convenience
pub use vttcli_sdk as sdk;

pub mod cli;
pub mod collections;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod permissions;
pub mod response;
pub mod testing;

// Re-export commonly used items
pub use cli::{Cli, CommandMiddleware, ResponseMiddleware, RoutingMiddleware};
pub use collections::{Callback, Keyed, KeyedList, UniqueList};
pub use command::{Command, CommandCallback};
pub use config::{CliConfig, ConfigError, ConfigResult};
pub use dispatch::{escape_html, Dispatcher};
pub use errors::{CliError, CliResult};
pub use permissions::{CommandPermissions, GroupPredicate, GroupRegistry};
pub use response::{CommandReply, CommandResponse, Recipient};

// Re-export the host-facing SDK types
pub use vttcli_sdk::{ChatHost, ChatMessage, MessageKind, MessageTarget, PlayerId};
