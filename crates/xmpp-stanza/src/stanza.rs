//! Typed read-only views over inbound stanzas.
//!
//! A [`Stanza`] borrows an [`Element`] and answers the questions a client
//! asks of it: who sent it, what type it is, what the body says, which
//! error condition it carries and which MUC occupant data it holds.

use crate::element::Element;
use crate::jid::Jid;
use crate::ns;

/// Top-level stanza kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StanzaKind {
    /// `<presence/>`
    Presence,
    /// `<message/>`
    Message,
    /// `<iq/>`
    Iq,
    /// Anything else (stream errors, features, ...).
    Other,
}

impl StanzaKind {
    /// Static label for logging and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Presence => "presence",
            Self::Message => "message",
            Self::Iq => "iq",
            Self::Other => "other",
        }
    }
}

/// The `type` attribute of a presence stanza.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PresenceType {
    /// No `type` attribute: the entity is available.
    Available,
    /// `unavailable`
    Unavailable,
    /// `subscribe`
    Subscribe,
    /// `subscribed`
    Subscribed,
    /// `unsubscribe`
    Unsubscribe,
    /// `unsubscribed`
    Unsubscribed,
    /// `probe`
    Probe,
    /// `error`
    Error,
}

impl PresenceType {
    /// Map a `type` attribute value. Unknown values are treated as
    /// available, as RFC 6121 has no other presence types.
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("unavailable") => Self::Unavailable,
            Some("subscribe") => Self::Subscribe,
            Some("subscribed") => Self::Subscribed,
            Some("unsubscribe") => Self::Unsubscribe,
            Some("unsubscribed") => Self::Unsubscribed,
            Some("probe") => Self::Probe,
            Some("error") => Self::Error,
            _ => Self::Available,
        }
    }
}

/// The `type` attribute of a message stanza.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// One-to-one chat.
    Chat,
    /// Multi-user chat room traffic.
    Groupchat,
    /// Alert-style message with no reply expected.
    Headline,
    /// Stand-alone message (the default when `type` is absent).
    Normal,
    /// Bounce carrying an error condition.
    Error,
}

impl MessageType {
    /// Map a `type` attribute value; absent or unknown values are `normal`.
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("chat") => Self::Chat,
            Some("groupchat") => Self::Groupchat,
            Some("headline") => Self::Headline,
            Some("error") => Self::Error,
            _ => Self::Normal,
        }
    }

    /// The wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Groupchat => "groupchat",
            Self::Headline => "headline",
            Self::Normal => "normal",
            Self::Error => "error",
        }
    }
}

/// One `<item/>` from a MUC user payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MucItem {
    /// Occupant role (`moderator`, `participant`, `visitor`, ...).
    pub role: Option<String>,
    /// Occupant affiliation (`owner`, `admin`, `member`, ...).
    pub affiliation: Option<String>,
    /// Real JID, when the room discloses it.
    pub jid: Option<Jid>,
}

/// Borrowed typed view over a stanza element.
#[derive(Clone, Copy, Debug)]
pub struct Stanza<'a> {
    element: &'a Element,
}

impl<'a> Stanza<'a> {
    /// Wrap an element.
    pub fn new(element: &'a Element) -> Self {
        Self { element }
    }

    /// The underlying element.
    pub fn element(&self) -> &'a Element {
        self.element
    }

    /// Which kind of stanza this is.
    pub fn kind(&self) -> StanzaKind {
        match self.element.name() {
            "presence" => StanzaKind::Presence,
            "message" => StanzaKind::Message,
            "iq" => StanzaKind::Iq,
            _ => StanzaKind::Other,
        }
    }

    /// Raw `from` attribute.
    pub fn from_attr(&self) -> Option<&'a str> {
        self.element.attr("from")
    }

    /// Sender address, if present and well formed.
    pub fn from(&self) -> Option<Jid> {
        self.from_attr().and_then(|s| Jid::parse(s).ok())
    }

    /// Recipient address, if present and well formed.
    pub fn to(&self) -> Option<Jid> {
        self.element.attr("to").and_then(|s| Jid::parse(s).ok())
    }

    /// Raw `type` attribute.
    pub fn type_attr(&self) -> Option<&'a str> {
        self.element.attr("type")
    }

    /// Raw `id` attribute.
    pub fn id(&self) -> Option<&'a str> {
        self.element.attr("id")
    }

    /// Presence type (meaningful for presence stanzas).
    pub fn presence_type(&self) -> PresenceType {
        PresenceType::from_attr(self.type_attr())
    }

    /// Message type (meaningful for message stanzas).
    pub fn message_type(&self) -> MessageType {
        MessageType::from_attr(self.type_attr())
    }

    /// Text of the `<body/>` child.
    pub fn body(&self) -> Option<String> {
        self.element.get_child_text("body")
    }

    /// Name of the defined condition inside `<error/>`, e.g. `item-not-found`.
    ///
    /// Prefers a child in the stanza-errors namespace and falls back to the
    /// first child that is not `<text/>`.
    pub fn error_condition(&self) -> Option<&'a str> {
        let error = self.element.get_child("error")?;
        error
            .children()
            .find(|c| c.ns() == Some(ns::STANZAS) && !c.is("text"))
            .or_else(|| error.children().find(|c| !c.is("text")))
            .map(Element::name)
    }

    /// Whether the message carries a chat state notification.
    pub fn has_chat_state(&self) -> bool {
        self.element.has_child_in_ns(ns::CHATSTATES)
    }

    /// Whether the stanza is a delayed (history) delivery.
    pub fn is_delayed(&self) -> bool {
        self.element.get_child_ns("delay", ns::DELAY).is_some()
    }

    /// The MUC user payload, if any.
    fn muc_user(&self) -> Option<&'a Element> {
        self.element.get_child_ns("x", ns::MUC_USER)
    }

    /// First `<item/>` of the MUC user payload.
    pub fn muc_item(&self) -> Option<MucItem> {
        let item = self.muc_user()?.get_child("item")?;
        Some(MucItem {
            role: item.attr("role").map(str::to_owned),
            affiliation: item.attr("affiliation").map(str::to_owned),
            jid: item.attr("jid").and_then(|s| Jid::parse(s).ok()),
        })
    }

    /// MUC status codes (`110` marks self-presence).
    pub fn muc_status_codes(&self) -> Vec<u16> {
        self.muc_user()
            .map(|x| {
                x.children()
                    .filter(|c| c.is("status"))
                    .filter_map(|c| c.attr("code")?.parse().ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Element {
        raw.parse().unwrap()
    }

    #[test]
    fn test_kind_and_types() {
        let el = parse(r#"<presence from="test@localhost/laptop" type="subscribe"/>"#);
        let stanza = Stanza::new(&el);
        assert_eq!(stanza.kind(), StanzaKind::Presence);
        assert_eq!(stanza.presence_type(), PresenceType::Subscribe);

        let el = parse("<message><body>hi</body></message>");
        let stanza = Stanza::new(&el);
        assert_eq!(stanza.kind(), StanzaKind::Message);
        assert_eq!(stanza.message_type(), MessageType::Normal);
        assert!(stanza.from().is_none());
    }

    #[test]
    fn test_error_condition() {
        let el = parse(
            "<presence type=\"error\"><error type=\"modify\">\
             <text xmlns=\"urn:ietf:params:xml:ns:xmpp-stanzas\">bad</text>\
             <jid-malformed xmlns=\"urn:ietf:params:xml:ns:xmpp-stanzas\"/>\
             </error></presence>",
        );
        assert_eq!(Stanza::new(&el).error_condition(), Some("jid-malformed"));

        let el = parse("<presence type=\"error\"><error><conflict/></error></presence>");
        assert_eq!(Stanza::new(&el).error_condition(), Some("conflict"));

        let el = parse("<presence type=\"error\"/>");
        assert_eq!(Stanza::new(&el).error_condition(), None);
    }

    #[test]
    fn test_chat_state_without_body() {
        let el = parse(
            "<message from=\"lloyd@localhost/laptop\" type=\"chat\">\
             <composing xmlns=\"http://jabber.org/protocol/chatstates\"/></message>",
        );
        let stanza = Stanza::new(&el);
        assert!(stanza.has_chat_state());
        assert!(stanza.body().is_none());
    }

    #[test]
    fn test_muc_item_and_status() {
        let el = parse(
            "<presence from=\"room@localhost/user\">\
             <x xmlns=\"http://jabber.org/protocol/muc#user\">\
             <item role=\"moderator\" affiliation=\"admin\" jid=\"user@localhost/pc\"/>\
             <status code=\"110\"/><status code=\"bogus\"/>\
             </x></presence>",
        );
        let stanza = Stanza::new(&el);
        let item = stanza.muc_item().unwrap();
        assert_eq!(item.role.as_deref(), Some("moderator"));
        assert_eq!(item.affiliation.as_deref(), Some("admin"));
        assert_eq!(item.jid.unwrap().to_string(), "user@localhost/pc");
        assert_eq!(stanza.muc_status_codes(), vec![110]);
    }

    #[test]
    fn test_delay_marker() {
        let el = parse(
            "<message type=\"groupchat\"><body>bot: uptime</body>\
             <delay xmlns=\"urn:xmpp:delay\" stamp=\"2024-01-01T00:00:00Z\"/></message>",
        );
        assert!(Stanza::new(&el).is_delayed());
    }
}
