//! XML namespaces used by the stanzas this crate understands.

/// Client stream namespace.
pub const JABBER_CLIENT: &str = "jabber:client";

/// Multi-user chat join payload (XEP-0045).
pub const MUC: &str = "http://jabber.org/protocol/muc";

/// Multi-user chat occupant payload (XEP-0045).
pub const MUC_USER: &str = "http://jabber.org/protocol/muc#user";

/// Chat state notifications (XEP-0085).
pub const CHATSTATES: &str = "http://jabber.org/protocol/chatstates";

/// Delayed delivery (XEP-0203).
pub const DELAY: &str = "urn:xmpp:delay";

/// Stanza error conditions (RFC 6120 §8.3).
pub const STANZAS: &str = "urn:ietf:params:xml:ns:xmpp-stanzas";
