//! Fundamental types for the stake ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account identities, timestamps, stake terms, position records, capability tiers
//! and the fixed reward parameters.

pub mod account;
pub mod error;
pub mod params;
pub mod position;
pub mod term;
pub mod tier;
pub mod time;

pub use account::AccountId;
pub use error::TypesError;
pub use params::LedgerParams;
pub use position::StakePosition;
pub use term::Term;
pub use tier::{Tier, TierSet};
pub use time::{Clock, SystemClock, Timestamp};
