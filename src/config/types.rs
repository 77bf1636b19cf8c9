//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::muc::MucConfig;
use crate::permission::AdminRule;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid admin pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Connection settings.
    pub connection: ConnectionConfig,
    /// Optional multi-user chat room to join.
    pub muc: Option<MucConfig>,
    /// Ordered admin rules; the first match grants permission.
    #[serde(default)]
    pub admins: Vec<AdminEntry>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Compile the admin entries into evaluable rules, preserving order.
    pub fn admin_rules(&self) -> Result<Vec<AdminRule>, ConfigError> {
        self.admins.iter().map(AdminEntry::to_rule).collect()
    }
}

/// Connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// The bot's own address (e.g., "bot@example.org/commander").
    pub jid: String,
    /// Stanza gateway to connect to (e.g., "127.0.0.1:5222").
    pub address: String,
    /// Maximum length of one framed stanza in bytes.
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
    /// Give up waiting for a command result after this many seconds.
    /// No timeout when unset.
    #[serde(default)]
    pub command_timeout_secs: Option<u64>,
    /// Prometheus metrics HTTP port.
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl ConnectionConfig {
    /// Command timeout as a duration, if configured.
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }
}

fn default_max_line_bytes() -> usize {
    xmpp_stanza::codec::DEFAULT_MAX_LINE
}

/// One admin rule as written in the config file.
///
/// ```toml
/// [[admins]]
/// jid = "lloyd@localhost"
///
/// [[admins]]
/// pattern = "^ops-.*@localhost$"
/// ```
///
/// Predicate rules have no file form; build them with [`AdminRule::predicate`].
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AdminEntry {
    /// Exact bare JID.
    Exact { jid: String },
    /// Regular expression searched in the bare JID.
    Pattern { pattern: String },
}

impl AdminEntry {
    /// Compile this entry.
    pub fn to_rule(&self) -> Result<AdminRule, ConfigError> {
        match self {
            Self::Exact { jid } => Ok(AdminRule::exact(jid.clone())),
            Self::Pattern { pattern } => {
                AdminRule::pattern(pattern).map_err(|source| ConfigError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })
            }
        }
    }
}
