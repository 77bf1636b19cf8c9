//! Unified error handling for xmpp-commander.
//!
//! Every variant of [`SessionError`] is fatal: it is returned at the point of
//! detection and is expected to end the session unless the embedding
//! application decides otherwise. Recoverable outcomes (ignored messages,
//! permission denials) are modelled as values, never as errors.

use thiserror::Error;

// ============================================================================
// Session Errors (fatal)
// ============================================================================

/// Fatal session errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The transport failed before the session was ever online.
    #[error("Could not connect to server: {0}")]
    ConnectionFailed(String),

    /// The transport failed after the session had been online.
    #[error("Server went away: {0}")]
    ServerLost(String),

    #[error("MUC room not specified")]
    MucMissingRoom,

    #[error("MUC server not specified")]
    MucMissingServer,

    #[error("MUC nick not specified")]
    MucMissingNick,

    /// The room rejected the join; carries the stanza error condition.
    #[error("Failed to join MUC room: {0}")]
    MucJoinFailed(String),

    #[error("Bot left the MUC room")]
    MucBotLeft,
}

impl SessionError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConnectionFailed(_) => "connection_failed",
            Self::ServerLost(_) => "server_lost",
            Self::MucMissingRoom => "muc_missing_room",
            Self::MucMissingServer => "muc_missing_server",
            Self::MucMissingNick => "muc_missing_nick",
            Self::MucJoinFailed(_) => "muc_join_failed",
            Self::MucBotLeft => "muc_bot_left",
        }
    }

    /// Whether the connection had been established when this occurred.
    pub fn was_online(&self) -> bool {
        !matches!(self, Self::ConnectionFailed(_))
    }
}

/// Result type for session event handling.
pub type SessionResult<T> = Result<T, SessionError>;
