//! The per-account stake position record.

use serde::{Deserialize, Serialize};

use crate::{Term, Timestamp};

/// Stake position held by one account.
///
/// Never deleted from storage: closing zeroes `principal` and clears
/// `active`, and the next open overwrites every field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePosition {
    /// Staked asset units. Zero when no position was ever opened or it was closed.
    pub principal: u128,
    /// Most recent accrual checkpoint: the open time, or the last reward withdrawal.
    pub start_time: Timestamp,
    /// Term in months. In {1, 3, 6, 12} at open; extensions add to it.
    pub term_months: u32,
    /// True while principal is under custody and accruing.
    pub active: bool,
}

impl StakePosition {
    /// A freshly opened position.
    pub fn open(principal: u128, term: Term, now: Timestamp) -> Self {
        Self {
            principal,
            start_time: now,
            term_months: term.months(),
            active: true,
        }
    }

    pub fn is_open(&self) -> bool {
        self.active
    }

    /// Length of the current term in seconds for a given month length.
    pub fn term_secs(&self, seconds_per_month: u64) -> u64 {
        u64::from(self.term_months).saturating_mul(seconds_per_month)
    }

    /// Earliest time a normal close is permitted.
    pub fn matures_at(&self, seconds_per_month: u64) -> Timestamp {
        self.start_time.plus(self.term_secs(seconds_per_month))
    }

    /// Zero the principal and deactivate; other fields are left as they are.
    pub fn cleared(&self) -> Self {
        Self {
            principal: 0,
            active: false,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_position_is_empty() {
        let pos = StakePosition::default();
        assert_eq!(pos.principal, 0);
        assert!(!pos.is_open());
    }

    #[test]
    fn cleared_keeps_checkpoint_and_term() {
        let pos = StakePosition::open(500, Term::SixMonths, Timestamp::new(42));
        let cleared = pos.cleared();
        assert_eq!(cleared.principal, 0);
        assert!(!cleared.active);
        assert_eq!(cleared.start_time, Timestamp::new(42));
        assert_eq!(cleared.term_months, 6);
    }

    #[test]
    fn maturity_uses_fixed_month_length() {
        let pos = StakePosition::open(1, Term::ThreeMonths, Timestamp::new(100));
        assert_eq!(pos.matures_at(30 * 86_400), Timestamp::new(100 + 3 * 30 * 86_400));
    }
}
