//! Fixed reward and settlement parameters.
//!
//! These are deployment constants: the ledger never changes them at runtime.

use serde::{Deserialize, Serialize};

/// 365 days, no leap-year adjustment.
pub const SECONDS_PER_YEAR: u64 = 365 * 86_400;

/// Fixed 30-day month used for term gating.
pub const SECONDS_PER_MONTH: u64 = 30 * 86_400;

/// Parameters of the reward formula and the emergency penalty.
///
/// `reward = round_half_up(principal × apy_bps × elapsed × reward_scale
///                         / (rate_divisor × seconds_per_year × reward_scale))`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerParams {
    /// Annual rate constant. Default: 275.
    pub apy_bps: u64,

    /// Divisor applied to `apy_bps`. Default: 100.
    pub rate_divisor: u64,

    /// Length of the accrual year in seconds.
    pub seconds_per_year: u64,

    /// Fixed-point multiplier applied before the final division.
    pub reward_scale: u64,

    /// Length of one term month in seconds.
    pub seconds_per_month: u64,

    /// Percentage of principal withheld on emergency close. Default: 10.
    pub emergency_penalty_pct: u64,
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self {
            apy_bps: 275,
            rate_divisor: 100,
            seconds_per_year: SECONDS_PER_YEAR,
            reward_scale: 1_000_000,
            seconds_per_month: SECONDS_PER_MONTH,
            emergency_penalty_pct: 10,
        }
    }
}

impl LedgerParams {
    /// Penalty withheld from `principal` on emergency close (truncating).
    pub fn emergency_penalty(&self, principal: u128) -> u128 {
        let pct = u128::from(self.emergency_penalty_pct);
        match principal.checked_mul(pct) {
            Some(scaled) => scaled / 100,
            // floor(P * pct / 100) split over P = 100q + r.
            None => (principal / 100)
                .saturating_mul(pct)
                .saturating_add(principal % 100 * pct / 100),
        }
    }
}
