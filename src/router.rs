//! Message classification.
//!
//! Decides whether an inbound message is addressed to the bot, extracts the
//! command text and picks where the reply goes. Routing never mutates
//! session state.

use crate::muc::MucSession;
use xmpp_stanza::{Jid, MessageType, Stanza};

/// Why a message was dropped without a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No body, or only whitespace (chat states, receipts).
    NoBody,
    /// A bounce carrying an error condition.
    ErrorType,
    /// Missing or unparseable `from`.
    NoSender,
    /// Headline messages expect no reply.
    Headline,
    /// Groupchat echo of the bot's own message.
    OwnMessage,
    /// Room history replay.
    Delayed,
    /// Sender's room role is not allowed to issue commands.
    RoleNotAllowed,
    /// Nothing left after the nick prefix.
    EmptyCommand,
}

impl IgnoreReason {
    /// Static label for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoBody => "no_body",
            Self::ErrorType => "error_type",
            Self::NoSender => "no_sender",
            Self::Headline => "headline",
            Self::OwnMessage => "own_message",
            Self::Delayed => "delayed",
            Self::RoleNotAllowed => "role_not_allowed",
            Self::EmptyCommand => "empty_command",
        }
    }
}

/// A message the bot should act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectedCommand {
    /// Command text with any nick prefix removed.
    pub text: String,
    /// Full `from` of the message.
    pub sender: Jid,
    /// Where the reply goes.
    pub reply_to: Jid,
    /// `chat` or `groupchat`.
    pub reply_type: MessageType,
}

/// Routing decision for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Ignore(IgnoreReason),
    /// Room traffic not addressed to the bot.
    NotForMe,
    Command(DirectedCommand),
}

/// Strip a leading `nick` followed by `:`, `,` or whitespace.
///
/// Returns the trimmed remainder, or `None` if the body is not addressed to
/// `nick`.
pub fn strip_nick_prefix<'a>(body: &'a str, nick: &str) -> Option<&'a str> {
    let rest = body.trim_start().strip_prefix(nick)?;
    match rest.chars().next() {
        None => Some(""),
        Some(c) if c == ':' || c == ',' => Some(rest[c.len_utf8()..].trim()),
        Some(c) if c.is_whitespace() => Some(rest.trim()),
        Some(_) => None,
    }
}

/// Classifies messages for one session.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageRouter<'a> {
    muc: Option<&'a MucSession>,
}

impl<'a> MessageRouter<'a> {
    /// Router for a session that has joined (or is joining) `muc`, or for a
    /// plain one-to-one session when `None`.
    pub fn new(muc: Option<&'a MucSession>) -> Self {
        Self { muc }
    }

    pub fn route(&self, stanza: &Stanza<'_>) -> Route {
        let Some(body) = stanza.body().filter(|b| !b.trim().is_empty()) else {
            return Route::Ignore(IgnoreReason::NoBody);
        };
        let kind = stanza.message_type();
        if kind == MessageType::Error {
            return Route::Ignore(IgnoreReason::ErrorType);
        }
        let Some(sender) = stanza.from() else {
            return Route::Ignore(IgnoreReason::NoSender);
        };

        let Some(muc) = self.muc else {
            return command(body.trim(), sender.clone(), sender, MessageType::Chat);
        };

        let routed = match kind {
            MessageType::Groupchat => {
                if !muc.is_room(&sender) {
                    return Route::NotForMe;
                }
                if sender.resource() == Some(muc.nick()) {
                    return Route::Ignore(IgnoreReason::OwnMessage);
                }
                if stanza.is_delayed() {
                    return Route::Ignore(IgnoreReason::Delayed);
                }
                let Some(text) = strip_nick_prefix(&body, muc.nick()) else {
                    return Route::NotForMe;
                };
                command(text, sender, muc.room_jid().clone(), MessageType::Groupchat)
            }
            MessageType::Chat | MessageType::Normal => {
                let text = strip_nick_prefix(&body, muc.nick()).unwrap_or(body.trim());
                command(text, sender.clone(), sender, MessageType::Chat)
            }
            MessageType::Headline => return Route::Ignore(IgnoreReason::Headline),
            MessageType::Error => return Route::Ignore(IgnoreReason::ErrorType),
        };

        match routed {
            Route::Command(ref cmd) if !muc.role_permits(&cmd.sender) => {
                tracing::debug!(sender = %cmd.sender, "role gate rejected sender");
                Route::Ignore(IgnoreReason::RoleNotAllowed)
            }
            other => other,
        }
    }
}

fn command(text: &str, sender: Jid, reply_to: Jid, reply_type: MessageType) -> Route {
    if text.is_empty() {
        return Route::Ignore(IgnoreReason::EmptyCommand);
    }
    Route::Command(DirectedCommand {
        text: text.to_owned(),
        sender,
        reply_to,
        reply_type,
    })
}
