//! Custody gateway: the external value-transfer capability.
//!
//! The same primitive pulls stake into the vault and pays it back out; only
//! the sender and recipient differ.

use stake_types::AccountId;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CustodyError {
    #[error("insufficient balance in {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: AccountId,
        needed: u128,
        available: u128,
    },

    #[error("transfer rejected: {0}")]
    Rejected(String),

    #[error("custody backend error: {0}")]
    Backend(String),
}

/// Moves asset units between accounts. May fail; never partially succeeds.
pub trait CustodyGateway {
    fn transfer(&self, from: &AccountId, to: &AccountId, amount: u128)
        -> Result<(), CustodyError>;
}

impl<T: CustodyGateway + ?Sized> CustodyGateway for Arc<T> {
    fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), CustodyError> {
        (**self).transfer(from, to, amount)
    }
}

impl<T: CustodyGateway + ?Sized> CustodyGateway for &T {
    fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), CustodyError> {
        (**self).transfer(from, to, amount)
    }
}
