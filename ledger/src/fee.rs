//! Minimum transaction-price gate.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::LedgerError;

/// Rejects mutating calls whose offered price is below a configurable floor.
///
/// Advisory only: it never touches ledger state.
#[derive(Debug, Default)]
pub struct FeeGate {
    minimum: AtomicU64,
}

impl FeeGate {
    pub fn new(minimum: u64) -> Self {
        Self {
            minimum: AtomicU64::new(minimum),
        }
    }

    pub fn minimum(&self) -> u64 {
        self.minimum.load(Ordering::Relaxed)
    }

    pub fn set_minimum(&self, minimum: u64) {
        self.minimum.store(minimum, Ordering::Relaxed);
    }

    pub fn check(&self, offered: u64) -> Result<(), LedgerError> {
        let minimum = self.minimum();
        if offered < minimum {
            return Err(LedgerError::FeeTooLow { offered, minimum });
        }
        Ok(())
    }
}
