//! Position storage trait.

use crate::StoreError;
use stake_types::{AccountId, StakePosition};
use std::sync::Arc;

/// Single-position-per-account storage.
///
/// Uniqueness of open positions is the controller's concern; the store only
/// keeps the latest record per account.
pub trait PositionStore {
    /// The account's position, or an empty default record if none was ever written.
    fn get_position(&self, account: &AccountId) -> Result<StakePosition, StoreError>;

    /// Overwrite the account's position.
    fn put_position(&self, account: &AccountId, position: &StakePosition)
        -> Result<(), StoreError>;

    /// Zero the principal and clear `active`; other fields are kept.
    fn clear_position(&self, account: &AccountId) -> Result<(), StoreError> {
        let cleared = self.get_position(account)?.cleared();
        self.put_position(account, &cleared)
    }

    /// Every stored record, open or not.
    fn iter_positions(&self) -> Result<Vec<(AccountId, StakePosition)>, StoreError>;

    /// Number of currently open positions.
    fn open_position_count(&self) -> Result<u64, StoreError> {
        Ok(self
            .iter_positions()?
            .iter()
            .filter(|(_, p)| p.active)
            .count() as u64)
    }
}

impl<T: PositionStore + ?Sized> PositionStore for Arc<T> {
    fn get_position(&self, account: &AccountId) -> Result<StakePosition, StoreError> {
        (**self).get_position(account)
    }

    fn put_position(
        &self,
        account: &AccountId,
        position: &StakePosition,
    ) -> Result<(), StoreError> {
        (**self).put_position(account, position)
    }

    fn clear_position(&self, account: &AccountId) -> Result<(), StoreError> {
        (**self).clear_position(account)
    }

    fn iter_positions(&self) -> Result<Vec<(AccountId, StakePosition)>, StoreError> {
        (**self).iter_positions()
    }
}
