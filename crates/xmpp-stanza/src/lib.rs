//! # xmpp-stanza
//!
//! A small Rust library for the XMPP stanza layer: addressing, element
//! trees, parsing and serialization of single stanzas, and typed read-only
//! views over presence and message stanzas.
//!
//! ## Features
//!
//! - [`Jid`] parsing and formatting (`node@domain/resource`)
//! - An owned [`Element`] tree with a builder and an escaping serializer
//! - A nom-based parser for one stanza at a time
//! - [`Stanza`] views exposing sender, recipient, type, body and MUC payloads
//! - Constructors for the stanzas a bot sends (availability, MUC join, replies)
//! - Optional Tokio integration: [`StanzaCodec`] frames one stanza per line
//!
//! ## Quick Start
//!
//! ```rust
//! use xmpp_stanza::{Element, Stanza, MessageType};
//!
//! let raw = r#"<message from="lloyd@localhost/laptop" type="chat"><body>uptime</body></message>"#;
//! let element: Element = raw.parse().expect("valid stanza");
//! let stanza = Stanza::new(&element);
//!
//! assert_eq!(stanza.message_type(), MessageType::Chat);
//! assert_eq!(stanza.body().as_deref(), Some("uptime"));
//! assert_eq!(stanza.from().unwrap().bare().to_string(), "lloyd@localhost");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod constructors;
pub mod element;
pub mod error;
pub mod jid;
pub mod ns;
pub mod stanza;

#[cfg(feature = "tokio")]
pub mod codec;

pub use self::element::{Element, ElementBuilder, Node};
pub use self::error::{Result, StanzaError};
pub use self::jid::Jid;
pub use self::stanza::{MessageType, MucItem, PresenceType, Stanza, StanzaKind};

#[cfg(feature = "tokio")]
pub use self::codec::StanzaCodec;
