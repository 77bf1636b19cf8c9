//! Jabber identifiers.
//!
//! A JID addresses an entity on the network: `node@domain/resource`. The
//! node and resource parts are optional; a JID without a resource is "bare",
//! one with a resource is "full".
//!
//! # Reference
//! - RFC 7622: Extensible Messaging and Presence Protocol (XMPP): Address Format

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StanzaError};

/// An XMPP address.
#[derive(Clone, Eq, PartialEq, Debug, Hash, PartialOrd, Ord)]
pub struct Jid {
    node: Option<String>,
    domain: String,
    resource: Option<String>,
}

impl Jid {
    /// Parse a JID string.
    ///
    /// The resource is everything after the first `/`; the node is everything
    /// before the first `@` of the remaining part.
    ///
    /// # Example
    ///
    /// ```
    /// use xmpp_stanza::Jid;
    ///
    /// let jid = Jid::parse("room@conference.example.org/bot").unwrap();
    /// assert_eq!(jid.node(), Some("room"));
    /// assert_eq!(jid.domain(), "conference.example.org");
    /// assert_eq!(jid.resource(), Some("bot"));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let (address, resource) = match s.split_once('/') {
            Some((_, "")) => return Err(StanzaError::invalid_jid(s, "empty resource")),
            Some((address, resource)) => (address, Some(resource.to_owned())),
            None => (s, None),
        };

        let (node, domain) = match address.split_once('@') {
            Some(("", _)) => return Err(StanzaError::invalid_jid(s, "empty node")),
            Some((node, domain)) => (Some(node.to_owned()), domain),
            None => (None, address),
        };

        if domain.is_empty() {
            return Err(StanzaError::invalid_jid(s, "empty domain"));
        }
        if domain.contains('@') {
            return Err(StanzaError::invalid_jid(s, "domain contains '@'"));
        }
        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(StanzaError::invalid_jid(s, "whitespace or control character"));
        }

        Ok(Self {
            node,
            domain: domain.to_owned(),
            resource,
        })
    }

    /// Build a bare JID from node and domain parts.
    pub fn bare_from_parts(node: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            node: Some(node.into()),
            domain: domain.into(),
            resource: None,
        }
    }

    /// The node (local) part, if any.
    pub fn node(&self) -> Option<&str> {
        self.node.as_deref()
    }

    /// The domain part.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The resource part, if any.
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// Whether this JID has no resource.
    pub fn is_bare(&self) -> bool {
        self.resource.is_none()
    }

    /// This JID with the resource removed.
    #[must_use]
    pub fn bare(&self) -> Jid {
        Self {
            node: self.node.clone(),
            domain: self.domain.clone(),
            resource: None,
        }
    }

    /// This JID with the given resource.
    #[must_use]
    pub fn with_resource(&self, resource: impl Into<String>) -> Jid {
        Self {
            node: self.node.clone(),
            domain: self.domain.clone(),
            resource: Some(resource.into()),
        }
    }

    /// Compare the bare parts of two JIDs.
    pub fn same_bare(&self, other: &Jid) -> bool {
        self.node == other.node && self.domain == other.domain
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(node) = &self.node {
            write!(f, "{}@", node)?;
        }
        f.write_str(&self.domain)?;
        if let Some(resource) = &self.resource {
            write!(f, "/{}", resource)?;
        }
        Ok(())
    }
}

impl FromStr for Jid {
    type Err = StanzaError;

    fn from_str(s: &str) -> Result<Self> {
        Jid::parse(s)
    }
}
