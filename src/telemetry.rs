//! Telemetry utilities: command timing and span constructors.

use std::time::Instant;

/// Guard for timing an executor call.
///
/// Records command latency when dropped.
pub struct CommandTimer {
    start: Instant,
}

impl CommandTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for CommandTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        crate::metrics::record_command_latency(self.start.elapsed().as_secs_f64());
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, debug_span, info_span};
    use xmpp_stanza::Jid;

    /// Span for the whole session of one bot account.
    pub fn session(jid: &str) -> Span {
        info_span!("session", jid = %jid)
    }

    /// Span for handling one inbound stanza.
    pub fn stanza(kind: &str, from: Option<&str>) -> Span {
        debug_span!("stanza", kind = %kind, from = from.unwrap_or("-"))
    }

    /// Span for one executor call.
    pub fn command(text: &str, sender: &Jid) -> Span {
        info_span!("command", text = %text, sender = %sender)
    }
}
