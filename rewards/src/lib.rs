//! Reward engine: the accrual half of the stake ledger.
//!
//! Reward is a pure function of principal and elapsed time:
//! `reward = round_half_up(P × APY × Δt × SCALE / (DIV × YEAR × SCALE))`
//!
//! This crate handles:
//! - The fixed-rate accrual formula over a 365-day year
//! - Round-half-up integer division
//! - Refusing to accrue against a position that is not open

pub mod engine;
pub mod error;

pub use engine::{div_round_half_up, RewardEngine};
pub use error::RewardError;
