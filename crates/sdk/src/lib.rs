//! VTTCLI SDK - Tabletop Chat Sandbox Type Definitions
//!
//! This crate contains the types exchanged between the command interpreter
//! and the hosting chat sandbox. It has no dependencies and compiles
//! quickly, allowing parallel compilation of dependent crates.
//!
//! # Modules
//!
//! - [`message`] - Inbound chat message model
//! - [`host`] - The collaborator trait the sandbox implements

pub mod host;
pub mod message;

pub use host::{ChatHost, MessageTarget};
pub use message::{ChatMessage, MessageKind, PlayerId};
