//! Integration test common infrastructure.
//!
//! Provides a session harness over in-memory channels, a recording command
//! executor and a fake line gateway for end-to-end tests over TCP.

pub mod bot;
pub mod executor;
pub mod gateway;

#[allow(unused_imports)]
pub use bot::TestBot;
#[allow(unused_imports)]
pub use executor::RecordingExecutor;
#[allow(unused_imports)]
pub use gateway::TestGateway;

use xmpp_stanza::Element;

/// Parse a stanza literal.
#[allow(dead_code)]
pub fn stanza(raw: &str) -> Element {
    raw.parse().expect("test stanza must parse")
}
