//! Reward-specific errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RewardError {
    #[error("position is not active, nothing accrues")]
    InactivePosition,

    #[error("arithmetic overflow in reward computation")]
    Overflow,

    #[error("reward denominator is zero")]
    ZeroDenominator,
}
