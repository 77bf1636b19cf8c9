//! xmpp-commander - session core for an XMPP command bot.
//!
//! Connects to an XMPP network through a [`transport`], optionally joins one
//! multi-user chat room, authorizes senders against ordered admin rules and
//! hands their commands to a pluggable [`executor::CommandExecutor`].
//!
//! The protocol decisions live in the sans-IO [`session::Session`]; the
//! tokio side is [`session::SessionActor`].

pub mod config;
pub mod error;
pub mod executor;
pub mod http;
pub mod metrics;
pub mod muc;
pub mod permission;
pub mod router;
pub mod session;
pub mod telemetry;
pub mod transport;

pub use error::{SessionError, SessionResult};
pub use session::{ConnectionState, Session, SessionActor};
pub use transport::TransportEvent;
