//! Nullable store: thread-safe in-memory storage for testing.

use stake_store::{
    BatchOp, BatchStore, MetaStore, PositionStore, RoleStore, StoreError, Totals, TotalsStore,
    WriteBatch,
};
use stake_types::{AccountId, StakePosition, TierSet};
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory implementation of every ledger store trait.
#[derive(Default)]
pub struct NullStore {
    positions: Mutex<HashMap<AccountId, StakePosition>>,
    totals: Mutex<Totals>,
    roles: Mutex<HashMap<AccountId, TierSet>>,
    meta: Mutex<HashMap<String, Vec<u8>>>,
    failing_batches: Mutex<bool>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `apply_batch` fail without writing anything.
    pub fn fail_batches(&self, failing: bool) {
        *self.failing_batches.lock().unwrap() = failing;
    }
}

impl PositionStore for NullStore {
    fn get_position(&self, account: &AccountId) -> Result<StakePosition, StoreError> {
        Ok(self
            .positions
            .lock()
            .unwrap()
            .get(account)
            .cloned()
            .unwrap_or_default())
    }

    fn put_position(
        &self,
        account: &AccountId,
        position: &StakePosition,
    ) -> Result<(), StoreError> {
        self.positions
            .lock()
            .unwrap()
            .insert(account.clone(), position.clone());
        Ok(())
    }

    fn iter_positions(&self) -> Result<Vec<(AccountId, StakePosition)>, StoreError> {
        let mut all: Vec<_> = self
            .positions
            .lock()
            .unwrap()
            .iter()
            .map(|(a, p)| (a.clone(), p.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(all)
    }
}

impl TotalsStore for NullStore {
    fn get_totals(&self) -> Result<Totals, StoreError> {
        Ok(*self.totals.lock().unwrap())
    }

    fn put_totals(&self, totals: &Totals) -> Result<(), StoreError> {
        *self.totals.lock().unwrap() = *totals;
        Ok(())
    }
}

impl RoleStore for NullStore {
    fn get_tiers(&self, account: &AccountId) -> Result<TierSet, StoreError> {
        Ok(self
            .roles
            .lock()
            .unwrap()
            .get(account)
            .copied()
            .unwrap_or_default())
    }

    fn put_tiers(&self, account: &AccountId, tiers: &TierSet) -> Result<(), StoreError> {
        let mut roles = self.roles.lock().unwrap();
        if tiers.is_empty() {
            roles.remove(account);
        } else {
            roles.insert(account.clone(), *tiers);
        }
        Ok(())
    }

    fn iter_tiers(&self) -> Result<Vec<(AccountId, TierSet)>, StoreError> {
        let mut all: Vec<_> = self
            .roles
            .lock()
            .unwrap()
            .iter()
            .map(|(a, t)| (a.clone(), *t))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(all)
    }
}

impl BatchStore for NullStore {
    fn apply_batch(&self, batch: &WriteBatch) -> Result<(), StoreError> {
        if *self.failing_batches.lock().unwrap() {
            return Err(StoreError::Backend("batch writes disabled".into()));
        }
        // Hold both locks so readers never see half a batch.
        let mut positions = self.positions.lock().unwrap();
        let mut totals = self.totals.lock().unwrap();
        for op in batch.ops() {
            match op {
                BatchOp::PutPosition { account, position } => {
                    positions.insert(account.clone(), position.clone());
                }
                BatchOp::PutTotals(t) => *totals = *t,
            }
        }
        Ok(())
    }
}

impl MetaStore for NullStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.meta
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.meta.lock().unwrap().get(key).cloned())
    }
}
