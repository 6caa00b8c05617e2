//! Capability tiers used by the authorization gate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// The two capability tiers an account can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Configures the fee gate, manages tiers, reads global figures.
    Administrator,
    /// Opens, closes, extends and settles its own position.
    Participant,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Administrator => "administrator",
            Tier::Participant => "participant",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "administrator" | "admin" => Ok(Tier::Administrator),
            "participant" => Ok(Tier::Participant),
            other => Err(TypesError::UnknownTier(other.to_string())),
        }
    }
}

/// The tiers held by one account. An account may hold both.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSet {
    pub administrator: bool,
    pub participant: bool,
}

impl TierSet {
    pub fn contains(&self, tier: Tier) -> bool {
        match tier {
            Tier::Administrator => self.administrator,
            Tier::Participant => self.participant,
        }
    }

    pub fn with(mut self, tier: Tier) -> Self {
        self.set(tier, true);
        self
    }

    pub fn without(mut self, tier: Tier) -> Self {
        self.set(tier, false);
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.administrator && !self.participant
    }

    fn set(&mut self, tier: Tier, value: bool) {
        match tier {
            Tier::Administrator => self.administrator = value,
            Tier::Participant => self.participant = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_set_grant_and_revoke() {
        let set = TierSet::default().with(Tier::Participant);
        assert!(set.contains(Tier::Participant));
        assert!(!set.contains(Tier::Administrator));
        let set = set.with(Tier::Administrator).without(Tier::Participant);
        assert!(set.contains(Tier::Administrator));
        assert!(!set.contains(Tier::Participant));
        assert!(!set.is_empty());
        assert!(set.without(Tier::Administrator).is_empty());
    }

    #[test]
    fn tier_parses_aliases() {
        assert_eq!("admin".parse::<Tier>(), Ok(Tier::Administrator));
        assert_eq!("Participant".parse::<Tier>(), Ok(Tier::Participant));
        assert!("owner".parse::<Tier>().is_err());
    }
}
