//! Constructors for the stanzas a client bot sends.

use crate::element::Element;
use crate::jid::Jid;
use crate::ns;
use crate::stanza::MessageType;

/// Initial availability: `<presence><show>chat</show></presence>`.
pub fn availability() -> Element {
    Element::builder("presence")
        .append(Element::builder("show").text("chat"))
        .build()
}

/// MUC join presence addressed to the occupant JID `room@server/nick`.
pub fn muc_join(occupant: &Jid, password: Option<&str>) -> Element {
    let mut x = Element::builder("x").ns(ns::MUC);
    if let Some(password) = password {
        x = x.append(Element::builder("password").text(password));
    }
    Element::builder("presence")
        .attr("to", occupant)
        .append(x)
        .build()
}

/// Accept a presence subscription from `to` (a bare JID).
pub fn subscribed(to: &Jid) -> Element {
    Element::builder("presence")
        .attr("to", to)
        .attr("type", "subscribed")
        .build()
}

/// A message with a text body.
pub fn message(to: &Jid, kind: MessageType, body: &str) -> Element {
    Element::builder("message")
        .attr("to", to)
        .attr("type", kind.as_str())
        .append(Element::builder("body").text(body))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability() {
        assert_eq!(
            availability().to_string(),
            "<presence><show>chat</show></presence>"
        );
    }

    #[test]
    fn test_muc_join_with_password() {
        let occupant = Jid::parse("chat@localhost/commander").unwrap();
        let el = muc_join(&occupant, Some("letmein"));
        assert_eq!(el.attr("to"), Some("chat@localhost/commander"));
        let x = el.get_child_ns("x", ns::MUC).unwrap();
        assert_eq!(x.get_child_text("password").as_deref(), Some("letmein"));
    }

    #[test]
    fn test_muc_join_without_password() {
        let occupant = Jid::parse("chat@localhost/commander").unwrap();
        let el = muc_join(&occupant, None);
        assert_eq!(
            el.to_string(),
            r#"<presence to="chat@localhost/commander"><x xmlns="http://jabber.org/protocol/muc"/></presence>"#
        );
    }

    #[test]
    fn test_message_reply() {
        let to = Jid::parse("room@localhost").unwrap();
        let el = message(&to, MessageType::Groupchat, "Server has been up a long time");
        assert_eq!(
            el.to_string(),
            r#"<message to="room@localhost" type="groupchat"><body>Server has been up a long time</body></message>"#
        );
    }
}
