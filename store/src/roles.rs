//! Capability tier storage.

use crate::StoreError;
use stake_types::{AccountId, Tier, TierSet};
use std::sync::Arc;

/// Persisted mapping from account to the tiers it holds.
pub trait RoleStore {
    /// Tiers held by the account; empty if it holds none.
    fn get_tiers(&self, account: &AccountId) -> Result<TierSet, StoreError>;

    fn put_tiers(&self, account: &AccountId, tiers: &TierSet) -> Result<(), StoreError>;

    /// Every account holding at least one tier.
    fn iter_tiers(&self) -> Result<Vec<(AccountId, TierSet)>, StoreError>;

    fn grant_tier(&self, account: &AccountId, tier: Tier) -> Result<(), StoreError> {
        let tiers = self.get_tiers(account)?.with(tier);
        self.put_tiers(account, &tiers)
    }

    fn revoke_tier(&self, account: &AccountId, tier: Tier) -> Result<(), StoreError> {
        let tiers = self.get_tiers(account)?.without(tier);
        self.put_tiers(account, &tiers)
    }

    fn administrator_count(&self) -> Result<u64, StoreError> {
        Ok(self
            .iter_tiers()?
            .iter()
            .filter(|(_, t)| t.administrator)
            .count() as u64)
    }
}

impl<T: RoleStore + ?Sized> RoleStore for Arc<T> {
    fn get_tiers(&self, account: &AccountId) -> Result<TierSet, StoreError> {
        (**self).get_tiers(account)
    }

    fn put_tiers(&self, account: &AccountId, tiers: &TierSet) -> Result<(), StoreError> {
        (**self).put_tiers(account, tiers)
    }

    fn iter_tiers(&self) -> Result<Vec<(AccountId, TierSet)>, StoreError> {
        (**self).iter_tiers()
    }
}
