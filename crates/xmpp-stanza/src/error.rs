//! Error types for the stanza library.
//!
//! This module defines errors for XML parsing failures, JID validation and
//! line framing.

use thiserror::Error;

/// Convenience type alias for Results using [`StanzaError`].
pub type Result<T, E = StanzaError> = std::result::Result<T, E>;

/// Top-level stanza errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StanzaError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Input was empty or whitespace only.
    #[error("empty stanza")]
    Empty,

    /// The XML could not be parsed.
    #[error("malformed xml at byte {position}: {context}")]
    Malformed {
        /// Byte offset where parsing failed.
        position: usize,
        /// What the parser was looking for.
        context: String,
    },

    /// A closing tag did not match the open element.
    #[error("mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedTag {
        /// Name of the element being closed.
        expected: String,
        /// Name found in the closing tag.
        found: String,
    },

    /// Data followed the root element.
    #[error("unexpected data after root element at byte {0}")]
    TrailingData(usize),

    /// A JID failed validation.
    #[error("invalid jid '{jid}': {reason}")]
    InvalidJid {
        /// The rejected input.
        jid: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A framed line exceeded the configured maximum.
    #[error("line too long (limit: {limit} bytes)")]
    LineTooLong {
        /// Maximum allowed length.
        limit: usize,
    },
}

impl StanzaError {
    pub(crate) fn invalid_jid(jid: &str, reason: &'static str) -> Self {
        Self::InvalidJid {
            jid: jid.to_owned(),
            reason,
        }
    }
}
