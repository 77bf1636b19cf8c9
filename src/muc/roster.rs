//! Occupant roster for the joined room.
//!
//! Best effort: entries appear only once a presence for the occupant has been
//! seen, and the roster is cleared when the bot leaves.

use std::collections::HashMap;
use xmpp_stanza::{Jid, MucItem};

/// What the room has told us about one occupant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Occupant {
    pub role: Option<String>,
    pub affiliation: Option<String>,
    /// Real JID, for non-anonymous rooms.
    pub real_jid: Option<Jid>,
}

/// Occupant JID (`room@server/nick`) to occupant data.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    occupants: HashMap<Jid, Occupant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an available presence. Fields missing from `item` keep their
    /// previous values.
    pub fn update(&mut self, occupant: Jid, item: Option<MucItem>) {
        let entry = self.occupants.entry(occupant).or_default();
        if let Some(item) = item {
            if item.role.is_some() {
                entry.role = item.role;
            }
            if item.affiliation.is_some() {
                entry.affiliation = item.affiliation;
            }
            if item.jid.is_some() {
                entry.real_jid = item.jid;
            }
        }
    }

    pub fn remove(&mut self, occupant: &Jid) -> Option<Occupant> {
        self.occupants.remove(occupant)
    }

    pub fn clear(&mut self) {
        self.occupants.clear();
    }

    pub fn get(&self, occupant: &Jid) -> Option<&Occupant> {
        self.occupants.get(occupant)
    }

    pub fn role(&self, occupant: &Jid) -> Option<&str> {
        self.get(occupant)?.role.as_deref()
    }

    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }
}
