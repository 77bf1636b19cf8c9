//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::{AdminEntry, Config};
use thiserror::Error;
use xmpp_stanza::Jid;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("connection.jid is invalid: {0}")]
    InvalidJid(String),
    #[error("connection.jid must include a node part, got '{0}'")]
    JidWithoutNode(String),
    #[error("connection.address is required")]
    MissingAddress,
    #[error("connection.max_line_bytes must be at least 256, got {0}")]
    LineLimitTooSmall(usize),
    #[error("connection.command_timeout_secs must be greater than zero")]
    ZeroCommandTimeout,
    #[error("admins[{0}] is empty")]
    EmptyAdmin(usize),
    #[error("admins[{index}] pattern does not compile: {reason}")]
    InvalidPattern { index: usize, reason: String },
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Jid::parse(&config.connection.jid) {
        Ok(jid) if jid.node().is_none() => {
            errors.push(ValidationError::JidWithoutNode(config.connection.jid.clone()));
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::InvalidJid(e.to_string())),
    }

    if config.connection.address.trim().is_empty() {
        errors.push(ValidationError::MissingAddress);
    }
    if config.connection.max_line_bytes < 256 {
        errors.push(ValidationError::LineLimitTooSmall(config.connection.max_line_bytes));
    }
    if config.connection.command_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroCommandTimeout);
    }

    for (index, entry) in config.admins.iter().enumerate() {
        match entry {
            AdminEntry::Exact { jid } if jid.trim().is_empty() => {
                errors.push(ValidationError::EmptyAdmin(index));
            }
            AdminEntry::Pattern { pattern } if pattern.is_empty() => {
                errors.push(ValidationError::EmptyAdmin(index));
            }
            AdminEntry::Pattern { pattern } => {
                if let Err(e) = regex::Regex::new(pattern) {
                    errors.push(ValidationError::InvalidPattern {
                        index,
                        reason: e.to_string(),
                    });
                }
            }
            AdminEntry::Exact { .. } => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
