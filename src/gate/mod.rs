//! Membership decision engine.

mod roster;

pub use roster::CachedRoster;
pub use roster::RosterError;
pub use roster::RosterSource;

use crate::steam::SteamId;
use std::collections::HashSet;

/// Outcome of a membership decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny,
    /// Membership could not be confirmed either way.
    Indeterminate,
}

impl Verdict {
    /// Wire form for the join-control hook: "1" admits, "0" refuses.
    /// Indeterminate refuses: without proof of membership, stay closed.
    pub fn allowed(&self) -> &'static str {
        match self {
            Self::Allow => "1",
            Self::Deny | Self::Indeterminate => "0",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Deny => write!(f, "deny"),
            Self::Indeterminate => write!(f, "indeterminate"),
        }
    }
}

/// Membership decision engine.
///
/// Fixed precedence, first match wins: static deny, static allow, then
/// group roster. The deny check runs before everything else, so a
/// denied id stays out whatever the other sources say; the allow check
/// runs before the roster, so static allowances survive roster outages.
pub struct Gate {
    allow: HashSet<SteamId>,
    deny: HashSet<SteamId>,
    roster: CachedRoster,
}

impl Gate {
    pub fn new(allow: HashSet<SteamId>, deny: HashSet<SteamId>, roster: CachedRoster) -> Self {
        Self {
            allow,
            deny,
            roster,
        }
    }

    /// Judge one canonical id.
    pub async fn decide(&self, id: SteamId) -> Verdict {
        if self.deny.contains(&id) {
            Verdict::Deny
        } else if self.allow.contains(&id) {
            Verdict::Allow
        } else {
            match self.roster.members().await {
                Err(e) => {
                    log::warn!("cannot vouch for {}: {}", id, e);
                    Verdict::Indeterminate
                }
                Ok(members) if members.contains(&id) => Verdict::Allow,
                Ok(_) => Verdict::Deny,
            }
        }
    }
}
