//! Sender authorization.
//!
//! An ordered list of [`AdminRule`]s decides whether a sender may issue
//! commands. Evaluation is a short-circuiting OR: the first rule that matches
//! grants permission; an empty list grants nothing.

use regex::Regex;
use std::fmt;
use std::sync::Arc;
use xmpp_stanza::{Jid, Stanza};

/// What a predicate rule can see besides the stanza itself.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Bare JID the decision is about.
    pub sender: &'a Jid,
    /// Room JID when the message arrived through the configured room.
    pub room: Option<&'a Jid>,
    /// The sender's occupant role, if the roster knows it.
    pub role: Option<&'a str>,
}

type PredicateFn = dyn Fn(&Stanza<'_>, &RuleContext<'_>) -> bool + Send + Sync;

/// One admin rule.
#[derive(Clone)]
pub enum AdminRule {
    /// Exact equality with the bare sender JID.
    Exact(String),
    /// Regular expression searched in the bare sender JID.
    Pattern(Regex),
    /// Arbitrary check over the stanza and its context.
    Predicate(Arc<PredicateFn>),
}

impl AdminRule {
    /// Match one bare JID exactly.
    pub fn exact(jid: impl Into<String>) -> Self {
        Self::Exact(jid.into())
    }

    /// Compile a pattern rule.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Pattern)
    }

    /// Wrap a closure as a rule.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Stanza<'_>, &RuleContext<'_>) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// Whether this rule grants permission.
    pub fn matches(&self, sender: &str, stanza: &Stanza<'_>, context: &RuleContext<'_>) -> bool {
        match self {
            Self::Exact(jid) => jid == sender,
            Self::Pattern(re) => re.is_match(sender),
            Self::Predicate(f) => f(stanza, context),
        }
    }
}

impl fmt::Debug for AdminRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(jid) => f.debug_tuple("Exact").field(jid).finish(),
            Self::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Evaluates the ordered admin rules.
#[derive(Debug, Clone, Default)]
pub struct PermissionEvaluator {
    rules: Vec<AdminRule>,
}

impl PermissionEvaluator {
    pub fn new(rules: Vec<AdminRule>) -> Self {
        Self { rules }
    }

    /// Whether `context.sender` may issue commands.
    pub fn evaluate(&self, stanza: &Stanza<'_>, context: &RuleContext<'_>) -> bool {
        let sender = context.sender.to_string();
        let granted = self
            .rules
            .iter()
            .position(|rule| rule.matches(&sender, stanza, context));

        match granted {
            Some(index) => {
                tracing::trace!(sender = %sender, rule = index, "admin rule matched");
                true
            }
            None => false,
        }
    }
}
