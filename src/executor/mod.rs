//! Command executor abstraction.
//!
//! The session hands every authorized command to a [`CommandExecutor`] and
//! sends whatever string comes back as the reply body.

use async_trait::async_trait;
use xmpp_stanza::{Element, Jid};

pub mod builtin;

pub use builtin::BuiltinCommands;

/// What the executor learns about the command's origin.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Full JID the command came from (an occupant JID for room traffic).
    pub sender: Jid,
    /// The message stanza as received.
    pub stanza: Element,
}

#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run one command. Each call yields exactly one reply body.
    async fn handle(&self, command: &str, context: CommandContext) -> String;
}
