//! Session core.
//!
//! [`Session`] is a sans-IO state machine: it is fed [`TransportEvent`]s and
//! answers with [`SessionAction`]s. [`SessionActor`] drives it from a tokio
//! task, runs the executor and sends the results.
//!
//! [`TransportEvent`]: crate::transport::TransportEvent

mod actor;
mod controller;

pub use actor::SessionActor;
pub use controller::{PERMISSION_DENIED, Session};

use crate::executor::CommandContext;
use xmpp_stanza::{Element, Jid, MessageType, constructors};

/// Connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Online,
    /// A fatal error was reported; further events are ignored.
    Faulted,
}

/// What the driver must do next.
#[derive(Debug, Clone)]
pub enum SessionAction {
    /// Write a stanza to the transport.
    Send(Element),
    /// Run a command and reply with its result.
    Dispatch(Dispatch),
}

/// An authorized command waiting for the executor.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub command: String,
    pub context: CommandContext,
    pub reply_to: Jid,
    pub reply_type: MessageType,
}

impl Dispatch {
    /// The reply message carrying `body`.
    pub fn reply(&self, body: &str) -> Element {
        constructors::message(&self.reply_to, self.reply_type, body)
    }
}
