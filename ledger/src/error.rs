use stake_types::{AccountId, Tier, Timestamp};
use thiserror::Error;

use crate::custody::CustodyError;
use crate::guard::Operation;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid term: {0} months (allowed: 1, 3, 6, 12)")]
    InvalidTerm(u32),

    #[error("stake amount must be non-zero")]
    InvalidAmount,

    #[error("account {0} already has an open position")]
    PositionAlreadyOpen(AccountId),

    #[error("account {0} has no open position")]
    NoActivePosition(AccountId),

    #[error("term not elapsed: matures at {matures_at}, now {now}")]
    TermNotElapsed { matures_at: Timestamp, now: Timestamp },

    #[error("no reward has accrued since the last checkpoint")]
    NoRewardDue,

    #[error("account {account} lacks the {required} tier")]
    Unauthorized { account: AccountId, required: Tier },

    #[error("offered fee {offered} is below the minimum {minimum}")]
    FeeTooLow { offered: u64, minimum: u64 },

    #[error("custody transfer failed: {0}")]
    TransferFailed(CustodyError),

    #[error("custody transfer failed ({transfer}) and rollback failed ({rollback})")]
    RollbackFailed {
        transfer: CustodyError,
        rollback: Box<LedgerError>,
    },

    #[error("position of {0} changed after commit, rollback refused")]
    RollbackConflict(AccountId),

    #[error("{operation} already in progress for {account}")]
    Reentrant {
        operation: Operation,
        account: AccountId,
    },

    #[error("ledger already has an administrator")]
    AlreadyInitialized,

    #[error("cannot revoke the last administrator")]
    LastAdministrator,

    #[error("arithmetic overflow in ledger counters")]
    Overflow,

    #[error("reward error: {0}")]
    Reward(#[from] stake_rewards::RewardError),

    #[error("store error: {0}")]
    Store(#[from] stake_store::StoreError),

    #[error("config error: {0}")]
    Config(String),
}
