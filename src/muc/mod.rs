//! Multi-user chat session for the single configured room.
//!
//! `MucSession` owns the join handshake and the occupant roster. It is
//! created from a [`MucConfig`] once the connection is online; creation
//! performs the config checks, in order room, server, nick.
//!
//! # Join lifecycle
//!
//! ```text
//! NotJoined --begin_join--> Joining --own presence--> Joined
//!                              |                         |
//!                              +--error presence--> Failed
//!                                                        |
//!                   NotJoined <--own unavailable---------+
//! ```

mod roster;

pub use roster::{Occupant, Roster};

use crate::error::{SessionError, SessionResult};
use serde::Deserialize;
use tracing::{debug, info, warn};
use xmpp_stanza::{Element, Jid, PresenceType, Stanza, constructors};

/// MUC status code marking a presence about the receiving occupant.
const STATUS_SELF_PRESENCE: u16 = 110;

/// Condition reported when an error presence names none.
const UNDEFINED_CONDITION: &str = "undefined-condition";

/// Room settings as configured. Room, server and nick are optional here so
/// that the session can report which one is missing.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct MucConfig {
    /// Room name, the node part of the room JID.
    pub room: Option<String>,
    /// MUC service domain.
    pub server: Option<String>,
    /// Nickname to join with.
    pub nick: Option<String>,
    /// Room password, if the room is protected.
    pub password: Option<String>,
    /// Only occupants holding one of these roles may issue commands.
    pub roles: Option<Vec<String>>,
}

fn required(value: &Option<String>, missing: SessionError) -> SessionResult<&str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(missing),
    }
}

/// Join progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinState {
    #[default]
    NotJoined,
    Joining,
    Joined,
    Failed,
}

/// What an inbound presence meant for the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceOutcome {
    /// The presence is not from the configured room.
    Unrelated,
    /// The bot's own occupant is now in the room.
    Joined,
    /// Another occupant appeared or changed.
    OccupantUpdated(Jid),
    /// Another occupant left.
    OccupantLeft(Jid),
    /// From the room but of no interest (probes, subscription traffic).
    Ignored,
}

/// Join state and roster for one room.
#[derive(Debug, Clone)]
pub struct MucSession {
    room: Jid,
    nick: String,
    password: Option<String>,
    allowed_roles: Option<Vec<String>>,
    state: JoinState,
    roster: Roster,
}

impl MucSession {
    /// Validate the config and build a session in `NotJoined`.
    pub fn new(config: &MucConfig) -> SessionResult<Self> {
        let room = required(&config.room, SessionError::MucMissingRoom)?;
        let server = required(&config.server, SessionError::MucMissingServer)?;
        let nick = required(&config.nick, SessionError::MucMissingNick)?;

        Ok(Self {
            room: Jid::bare_from_parts(room, server),
            nick: nick.to_owned(),
            password: config.password.clone(),
            allowed_roles: config.roles.clone(),
            state: JoinState::NotJoined,
            roster: Roster::new(),
        })
    }

    pub fn state(&self) -> JoinState {
        self.state
    }

    /// Bare room JID (`room@server`).
    pub fn room_jid(&self) -> &Jid {
        &self.room
    }

    /// The bot's occupant JID (`room@server/nick`).
    pub fn occupant_jid(&self) -> Jid {
        self.room.with_resource(self.nick.as_str())
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Whether `jid` belongs to the configured room.
    pub fn is_room(&self, jid: &Jid) -> bool {
        jid.same_bare(&self.room)
    }

    /// Start joining. Returns the join presence, or `None` when a join is
    /// already in flight or complete.
    pub fn begin_join(&mut self) -> Option<Element> {
        match self.state {
            JoinState::Joining | JoinState::Joined => {
                debug!(room = %self.room, state = ?self.state, "join already in progress");
                None
            }
            JoinState::NotJoined | JoinState::Failed => {
                self.state = JoinState::Joining;
                let occupant = self.occupant_jid();
                info!(occupant = %occupant, "joining room");
                Some(constructors::muc_join(&occupant, self.password.as_deref()))
            }
        }
    }

    fn is_own(&self, from: &Jid, stanza: &Stanza<'_>) -> bool {
        match from.resource() {
            None => true,
            Some(resource) if resource == self.nick => true,
            Some(_) => stanza.muc_status_codes().contains(&STATUS_SELF_PRESENCE),
        }
    }

    /// Apply an inbound presence.
    ///
    /// Errors are fatal: a room error presence fails the join, and the bot's
    /// own occupant going unavailable means it left.
    pub fn handle_presence(&mut self, stanza: &Stanza<'_>) -> SessionResult<PresenceOutcome> {
        let Some(from) = stanza.from() else {
            return Ok(PresenceOutcome::Unrelated);
        };
        if !self.is_room(&from) {
            return Ok(PresenceOutcome::Unrelated);
        }
        let own = self.is_own(&from, stanza);

        match stanza.presence_type() {
            PresenceType::Error => {
                self.state = JoinState::Failed;
                let condition = stanza.error_condition().unwrap_or(UNDEFINED_CONDITION);
                warn!(room = %self.room, condition, "room returned an error presence");
                Err(SessionError::MucJoinFailed(condition.to_owned()))
            }
            PresenceType::Unavailable if own => {
                self.state = JoinState::NotJoined;
                self.roster.clear();
                warn!(room = %self.room, "own occupant left the room");
                Err(SessionError::MucBotLeft)
            }
            PresenceType::Unavailable => {
                self.roster.remove(&from);
                Ok(PresenceOutcome::OccupantLeft(from))
            }
            PresenceType::Available => {
                if from.resource().is_some() {
                    self.roster.update(from.clone(), stanza.muc_item());
                }
                if own {
                    if self.state != JoinState::Joined {
                        info!(room = %self.room, nick = %self.nick, "joined room");
                    }
                    self.state = JoinState::Joined;
                    Ok(PresenceOutcome::Joined)
                } else {
                    Ok(PresenceOutcome::OccupantUpdated(from))
                }
            }
            _ => Ok(PresenceOutcome::Ignored),
        }
    }

    /// The role gate: with roles configured, the occupant must hold one.
    pub fn role_permits(&self, occupant: &Jid) -> bool {
        match &self.allowed_roles {
            None => true,
            Some(allowed) => self
                .roster
                .role(occupant)
                .is_some_and(|role| allowed.iter().any(|a| a == role)),
        }
    }

    /// Real JID of an occupant, when the room disclosed it.
    pub fn real_jid(&self, occupant: &Jid) -> Option<&Jid> {
        self.roster.get(occupant)?.real_jid.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MucConfig {
        MucConfig {
            room: Some("chat".into()),
            server: Some("localhost".into()),
            nick: Some("commander".into()),
            password: Some("letmein".into()),
            roles: None,
        }
    }

    fn presence(raw: &str) -> Element {
        raw.parse().unwrap()
    }

    fn joining() -> MucSession {
        let mut muc = MucSession::new(&config()).unwrap();
        assert!(muc.begin_join().is_some());
        muc
    }

    #[test]
    fn test_validation_order() {
        let none = MucConfig::default();
        assert_eq!(MucSession::new(&none).unwrap_err(), SessionError::MucMissingRoom);

        let no_server_or_nick = MucConfig {
            room: Some("test".into()),
            ..MucConfig::default()
        };
        assert_eq!(
            MucSession::new(&no_server_or_nick).unwrap_err(),
            SessionError::MucMissingServer
        );

        let no_nick = MucConfig {
            room: Some("test".into()),
            server: Some("localhost".into()),
            ..MucConfig::default()
        };
        assert_eq!(MucSession::new(&no_nick).unwrap_err(), SessionError::MucMissingNick);
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let cfg = MucConfig {
            room: Some("  ".into()),
            ..config()
        };
        assert_eq!(MucSession::new(&cfg).unwrap_err(), SessionError::MucMissingRoom);
    }

    #[test]
    fn test_begin_join_once() {
        let mut muc = MucSession::new(&config()).unwrap();
        let join = muc.begin_join().unwrap();
        assert_eq!(join.attr("to"), Some("chat@localhost/commander"));
        assert_eq!(muc.state(), JoinState::Joining);
        assert!(muc.begin_join().is_none());
    }

    #[test]
    fn test_own_presence_joins() {
        let mut muc = joining();
        let el = presence(
            "<presence from=\"chat@localhost/commander\">\
             <x xmlns=\"http://jabber.org/protocol/muc#user\"><item role=\"moderator\"/></x></presence>",
        );
        let outcome = muc.handle_presence(&Stanza::new(&el)).unwrap();
        assert_eq!(outcome, PresenceOutcome::Joined);
        assert_eq!(muc.state(), JoinState::Joined);
        assert_eq!(muc.roster().role(&muc.occupant_jid()), Some("moderator"));
    }

    #[test]
    fn test_status_110_marks_own_presence() {
        let mut muc = joining();
        let el = presence(
            "<presence from=\"chat@localhost/commander_\">\
             <x xmlns=\"http://jabber.org/protocol/muc#user\"><status code=\"110\"/></x></presence>",
        );
        assert_eq!(
            muc.handle_presence(&Stanza::new(&el)).unwrap(),
            PresenceOutcome::Joined
        );
    }

    #[test]
    fn test_error_presence_fails_join() {
        let mut muc = joining();
        let el = presence(
            "<presence from=\"chat@localhost\" type=\"error\">\
             <error type=\"modify\"><jid-malformed xmlns=\"urn:ietf:params:xml:ns:xmpp-stanzas\"/></error>\
             </presence>",
        );
        let err = muc.handle_presence(&Stanza::new(&el)).unwrap_err();
        assert_eq!(err, SessionError::MucJoinFailed("jid-malformed".into()));
        assert_eq!(muc.state(), JoinState::Failed);
    }

    #[test]
    fn test_own_unavailable_is_bot_left() {
        let mut muc = joining();
        let el = presence(r#"<presence from="chat@localhost" type="unavailable"/>"#);
        assert_eq!(
            muc.handle_presence(&Stanza::new(&el)).unwrap_err(),
            SessionError::MucBotLeft
        );
        assert_eq!(muc.state(), JoinState::NotJoined);
    }

    #[test]
    fn test_other_rooms_ignored() {
        let mut muc = joining();
        for raw in [
            r#"<presence from="chat@domain" type="error"><error><conflict/></error></presence>"#,
            r#"<presence from="chat@domain" type="unavailable"/>"#,
            r#"<presence from="other@localhost/commander"/>"#,
        ] {
            let el = presence(raw);
            assert_eq!(
                muc.handle_presence(&Stanza::new(&el)).unwrap(),
                PresenceOutcome::Unrelated
            );
            assert_eq!(muc.state(), JoinState::Joining);
        }
    }

    #[test]
    fn test_occupants_tracked() {
        let mut muc = joining();
        let el = presence(
            "<presence from=\"chat@localhost/user\">\
             <x xmlns=\"http://jabber.org/protocol/muc#user\">\
             <item role=\"participant\" jid=\"user@localhost/pc\"/></x></presence>",
        );
        let user = Jid::parse("chat@localhost/user").unwrap();
        assert_eq!(
            muc.handle_presence(&Stanza::new(&el)).unwrap(),
            PresenceOutcome::OccupantUpdated(user.clone())
        );
        assert_eq!(muc.real_jid(&user).map(Jid::to_string).as_deref(), Some("user@localhost/pc"));

        let el = presence(r#"<presence from="chat@localhost/user" type="unavailable"/>"#);
        assert_eq!(
            muc.handle_presence(&Stanza::new(&el)).unwrap(),
            PresenceOutcome::OccupantLeft(user.clone())
        );
        assert!(muc.roster().get(&user).is_none());
    }

    #[test]
    fn test_role_gate() {
        let mut muc = MucSession::new(&MucConfig {
            roles: Some(vec!["admin".into(), "moderator".into()]),
            ..config()
        })
        .unwrap();
        let user = Jid::parse("chat@localhost/user").unwrap();
        assert!(!muc.role_permits(&user));

        let el = presence(
            "<presence from=\"chat@localhost/user\">\
             <x xmlns=\"http://jabber.org/protocol/muc#user\"><item role=\"visitor\"/></x></presence>",
        );
        muc.handle_presence(&Stanza::new(&el)).unwrap();
        assert!(!muc.role_permits(&user));

        let el = presence(
            "<presence from=\"chat@localhost/user\">\
             <x xmlns=\"http://jabber.org/protocol/muc#user\"><item role=\"admin\"/></x></presence>",
        );
        muc.handle_presence(&Stanza::new(&el)).unwrap();
        assert!(muc.role_permits(&user));
    }

    #[test]
    fn test_no_roles_configured_permits_everyone() {
        let muc = MucSession::new(&config()).unwrap();
        assert!(muc.role_permits(&Jid::parse("chat@localhost/stranger").unwrap()));
    }
}
