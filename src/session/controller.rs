//! Session state machine.

use super::{ConnectionState, Dispatch, SessionAction};
use crate::config::{Config, ConfigError};
use crate::error::{SessionError, SessionResult};
use crate::executor::CommandContext;
use crate::metrics;
use crate::muc::{MucConfig, MucSession, PresenceOutcome};
use crate::permission::{AdminRule, PermissionEvaluator, RuleContext};
use crate::router::{DirectedCommand, MessageRouter, Route};
use crate::transport::TransportEvent;
use tracing::{debug, error, info, warn};
use xmpp_stanza::{Element, MessageType, PresenceType, Stanza, StanzaKind, constructors};

/// Body of the reply sent to unauthorized senders.
pub const PERMISSION_DENIED: &str = "Permission denied";

/// Sans-IO session controller.
///
/// Feed transport events with [`Session::handle`]; perform the returned
/// actions in order.
#[derive(Debug)]
pub struct Session {
    state: ConnectionState,
    was_online: bool,
    permissions: PermissionEvaluator,
    muc_config: Option<MucConfig>,
    muc: Option<MucSession>,
}

impl Session {
    #[must_use]
    pub fn new(rules: Vec<AdminRule>, muc_config: Option<MucConfig>) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            was_online: false,
            permissions: PermissionEvaluator::new(rules),
            muc_config,
            muc: None,
        }
    }

    /// Build from a loaded config, compiling the admin rules.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(config.admin_rules()?, config.muc.clone()))
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The room session, once the connection has come online with a room
    /// configured.
    pub fn muc(&self) -> Option<&MucSession> {
        self.muc.as_ref()
    }

    /// Attach to the transport. A no-op unless disconnected.
    pub fn start(&mut self) {
        if self.state == ConnectionState::Disconnected {
            self.state = ConnectionState::Connecting;
            debug!("session connecting");
        }
    }

    /// Process one transport event.
    ///
    /// An `Err` is fatal: the session is left `Faulted` and ignores all
    /// later events.
    pub fn handle(&mut self, event: TransportEvent) -> SessionResult<Vec<SessionAction>> {
        if self.state == ConnectionState::Faulted {
            return Ok(Vec::new());
        }
        let result = match event {
            TransportEvent::Online => self.handle_online(),
            TransportEvent::Error(reason) => Err(if self.was_online {
                SessionError::ServerLost(reason)
            } else {
                SessionError::ConnectionFailed(reason)
            }),
            TransportEvent::Stanza(element) => self.handle_stanza(&element),
        };

        if let Err(ref e) = result {
            self.state = ConnectionState::Faulted;
            metrics::record_session_error(e.error_code());
            error!(code = e.error_code(), error = %e, "session failed");
        }
        result
    }

    fn handle_online(&mut self) -> SessionResult<Vec<SessionAction>> {
        self.state = ConnectionState::Online;
        self.was_online = true;
        info!("session online");

        let Some(config) = &self.muc_config else {
            return Ok(vec![SessionAction::Send(constructors::availability())]);
        };
        if self.muc.is_none() {
            self.muc = Some(MucSession::new(config)?);
        }
        Ok(self
            .muc
            .as_mut()
            .and_then(MucSession::begin_join)
            .map(SessionAction::Send)
            .into_iter()
            .collect())
    }

    fn handle_stanza(&mut self, element: &Element) -> SessionResult<Vec<SessionAction>> {
        let stanza = Stanza::new(element);
        let kind = stanza.kind();
        metrics::record_stanza_received(kind.as_str());

        let _span = crate::telemetry::spans::stanza(kind.as_str(), stanza.from_attr()).entered();
        if self.state != ConnectionState::Online {
            debug!(state = ?self.state, "stanza before online, ignoring");
            return Ok(Vec::new());
        }

        match kind {
            StanzaKind::Presence => self.handle_presence(&stanza),
            StanzaKind::Message => Ok(self.handle_message(&stanza)),
            StanzaKind::Iq | StanzaKind::Other => {
                debug!("unhandled stanza");
                Ok(Vec::new())
            }
        }
    }

    fn handle_presence(&mut self, stanza: &Stanza<'_>) -> SessionResult<Vec<SessionAction>> {
        if stanza.presence_type() == PresenceType::Subscribe {
            let Some(from) = stanza.from() else {
                return Ok(Vec::new());
            };
            let bare = from.bare();
            info!(from = %bare, "accepting subscription");
            return Ok(vec![SessionAction::Send(constructors::subscribed(&bare))]);
        }

        let Some(muc) = &mut self.muc else {
            return Ok(Vec::new());
        };
        match muc.handle_presence(stanza)? {
            PresenceOutcome::Unrelated | PresenceOutcome::Ignored => {}
            PresenceOutcome::Joined => debug!("own room presence"),
            PresenceOutcome::OccupantUpdated(jid) => debug!(occupant = %jid, "occupant updated"),
            PresenceOutcome::OccupantLeft(jid) => debug!(occupant = %jid, "occupant left"),
        }
        Ok(Vec::new())
    }

    fn handle_message(&self, stanza: &Stanza<'_>) -> Vec<SessionAction> {
        let command = match MessageRouter::new(self.muc.as_ref()).route(stanza) {
            Route::Command(command) => command,
            Route::NotForMe => return Vec::new(),
            Route::Ignore(reason) => {
                debug!(reason = reason.as_str(), "message ignored");
                metrics::record_ignored(reason.as_str());
                return Vec::new();
            }
        };

        if !self.authorize(stanza, &command) {
            warn!(sender = %command.sender, command = %command.text, "permission denied");
            metrics::record_permission_denied();
            let denial =
                constructors::message(&command.sender, MessageType::Chat, PERMISSION_DENIED);
            return vec![SessionAction::Send(denial)];
        }

        metrics::record_command_dispatched();
        let DirectedCommand {
            text,
            sender,
            reply_to,
            reply_type,
        } = command;
        vec![SessionAction::Dispatch(Dispatch {
            command: text,
            context: CommandContext {
                sender,
                stanza: stanza.element().clone(),
            },
            reply_to,
            reply_type,
        })]
    }

    /// Evaluate the admin rules for a routed command.
    ///
    /// Room occupants are judged by their real JID when the room disclosed
    /// it, otherwise by the address the message came from.
    fn authorize(&self, stanza: &Stanza<'_>, command: &DirectedCommand) -> bool {
        let in_room = self.muc.as_ref().filter(|muc| muc.is_room(&command.sender));
        let principal = in_room
            .and_then(|muc| muc.real_jid(&command.sender))
            .unwrap_or(&command.sender)
            .bare();
        let context = RuleContext {
            sender: &principal,
            room: in_room.map(MucSession::room_jid),
            role: in_room.and_then(|muc| muc.roster().role(&command.sender)),
        };
        self.permissions.evaluate(stanza, &context)
    }
}
