//! Core reward computation.

use crate::error::RewardError;
use stake_types::{LedgerParams, StakePosition, Timestamp};

/// Integer division rounding half up: `q + 1` when `2r >= d`.
///
/// Not banker's rounding and not truncation: an exact half always rounds up.
pub fn div_round_half_up(numerator: u128, denominator: u128) -> Result<u128, RewardError> {
    if denominator == 0 {
        return Err(RewardError::ZeroDenominator);
    }
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    // remainder * 2 >= denominator, without overflowing the doubling.
    if remainder >= denominator - remainder {
        quotient.checked_add(1).ok_or(RewardError::Overflow)
    } else {
        Ok(quotient)
    }
}

/// Stateless reward calculator over a fixed parameter set.
#[derive(Clone, Debug, Default)]
pub struct RewardEngine {
    params: LedgerParams,
}

impl RewardEngine {
    pub fn new(params: LedgerParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &LedgerParams {
        &self.params
    }

    /// Reward accrued by `principal` over `elapsed_secs`.
    ///
    /// The scale factor multiplies numerator and denominator alike, so when
    /// the scaled numerator would overflow the unscaled quotient is used;
    /// both round identically.
    pub fn accrued(&self, principal: u128, elapsed_secs: u64) -> Result<u128, RewardError> {
        let p = &self.params;
        let base = principal
            .checked_mul(u128::from(p.apy_bps))
            .and_then(|v| v.checked_mul(u128::from(elapsed_secs)))
            .ok_or(RewardError::Overflow)?;
        let denominator = u128::from(p.rate_divisor)
            .checked_mul(u128::from(p.seconds_per_year))
            .ok_or(RewardError::Overflow)?;

        let scale = u128::from(p.reward_scale);
        let scaled = base
            .checked_mul(scale)
            .zip(denominator.checked_mul(scale));
        match scaled {
            Some((numerator, scaled_denominator)) => {
                div_round_half_up(numerator, scaled_denominator)
            }
            None => div_round_half_up(base, denominator),
        }
    }

    /// Reward accrued by an open position since its last checkpoint.
    pub fn accrued_for(
        &self,
        position: &StakePosition,
        now: Timestamp,
    ) -> Result<u128, RewardError> {
        if !position.active {
            return Err(RewardError::InactivePosition);
        }
        self.accrued(position.principal, position.start_time.elapsed_since(now))
    }
}
