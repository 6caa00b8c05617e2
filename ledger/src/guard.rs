//! Per-operation, per-account reentrancy guard.
//!
//! An operation holds its token from precondition checks until the custody
//! transfer has returned. A second entry into the same operation for the same
//! account while the token is alive is refused.

use serde::{Deserialize, Serialize};
use stake_types::AccountId;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::LedgerError;

/// The five position operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Open,
    Close,
    EmergencyClose,
    ExtendTerm,
    WithdrawReward,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Open => "open",
            Operation::Close => "close",
            Operation::EmergencyClose => "emergency-close",
            Operation::ExtendTerm => "extend-term",
            Operation::WithdrawReward => "withdraw-reward",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    in_flight: Mutex<HashSet<(Operation, AccountId)>>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `(operation, account)` as in flight until the token drops.
    pub fn enter(
        &self,
        operation: Operation,
        account: &AccountId,
    ) -> Result<GuardToken<'_>, LedgerError> {
        let key = (operation, account.clone());
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(key.clone()) {
            return Err(LedgerError::Reentrant {
                operation,
                account: account.clone(),
            });
        }
        Ok(GuardToken { guard: self, key })
    }
}

/// Releases its guard entry on drop.
#[derive(Debug)]
pub struct GuardToken<'a> {
    guard: &'a ReentrancyGuard,
    key: (Operation, AccountId),
}

impl Drop for GuardToken<'_> {
    fn drop(&mut self) {
        self.guard
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
