//! Custody over the local LMDB balance book.

use std::sync::Arc;

use stake_ledger::{CustodyError, CustodyGateway};
use stake_store_lmdb::{LmdbEnvironment, LmdbError};
use stake_types::AccountId;

/// Moves units between balances held in the same LMDB environment as the
/// ledger. Suitable for single-host operation and replay.
pub struct LmdbCustody {
    env: Arc<LmdbEnvironment>,
}

impl LmdbCustody {
    pub fn new(env: Arc<LmdbEnvironment>) -> Self {
        Self { env }
    }
}

impl CustodyGateway for LmdbCustody {
    fn transfer(&self, from: &AccountId, to: &AccountId, amount: u128) -> Result<(), CustodyError> {
        self.env
            .transfer_balance(from, to, amount)
            .map_err(|e| match e {
                LmdbError::InsufficientBalance {
                    account,
                    needed,
                    available,
                } => CustodyError::InsufficientBalance {
                    account,
                    needed,
                    available,
                },
                LmdbError::BalanceOverflow(account) => {
                    CustodyError::Rejected(format!("balance overflow for {account}"))
                }
                other => CustodyError::Backend(other.to_string()),
            })
    }
}
