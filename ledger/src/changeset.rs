//! Staged bookkeeping for a single operation.
//!
//! An operation reads the caller's position and the totals, mutates a local
//! copy, then commits it as one atomic batch. The commit remembers what this
//! operation changed so a failed custody transfer can take exactly that back
//! out, leaving anything committed by other calls in the meantime intact.

use stake_store::{BatchStore, PositionStore, StoreError, Totals, TotalsStore, WriteBatch};
use stake_types::{AccountId, StakePosition};

use crate::LedgerError;

#[derive(Clone, Debug)]
pub struct Changeset {
    account: AccountId,
    position_before: StakePosition,
    position: StakePosition,
    totals: Totals,
    principal_in: u128,
    principal_out: u128,
    liability_delta: i128,
}

impl Changeset {
    pub fn new(account: &AccountId, position: StakePosition, totals: Totals) -> Self {
        Self {
            account: account.clone(),
            position_before: position.clone(),
            position,
            totals,
            principal_in: 0,
            principal_out: 0,
            liability_delta: 0,
        }
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn position(&self) -> &StakePosition {
        &self.position
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    pub fn set_position(&mut self, position: StakePosition) {
        self.position = position;
    }

    pub fn add_principal(&mut self, amount: u128) -> Result<(), LedgerError> {
        self.totals.total_principal = self
            .totals
            .total_principal
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.principal_in = self
            .principal_in
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    pub fn sub_principal(&mut self, amount: u128) -> Result<(), LedgerError> {
        self.totals.total_principal = self
            .totals
            .total_principal
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow)?;
        self.principal_out = self
            .principal_out
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Recognize reward as outstanding liability.
    pub fn recognize_reward(&mut self, reward: u128) -> Result<(), LedgerError> {
        let reward = i128::try_from(reward).map_err(|_| LedgerError::Overflow)?;
        self.shift_liability(reward)
    }

    /// Release paid reward from the liability counter. May go negative.
    pub fn release_reward(&mut self, reward: u128) -> Result<(), LedgerError> {
        let reward = i128::try_from(reward).map_err(|_| LedgerError::Overflow)?;
        self.shift_liability(reward.checked_neg().ok_or(LedgerError::Overflow)?)
    }

    fn shift_liability(&mut self, delta: i128) -> Result<(), LedgerError> {
        self.totals.total_reward_liability = self
            .totals
            .total_reward_liability
            .checked_add(delta)
            .ok_or(LedgerError::Overflow)?;
        self.liability_delta = self
            .liability_delta
            .checked_add(delta)
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Write the staged position and totals atomically.
    pub fn commit<S: BatchStore>(self, store: &S) -> Result<Committed, StoreError> {
        let mut batch = WriteBatch::new();
        batch
            .put_position(&self.account, self.position.clone())
            .put_totals(self.totals);
        store.apply_batch(&batch)?;
        Ok(Committed {
            account: self.account,
            position_before: self.position_before,
            position_after: self.position,
            principal_in: self.principal_in,
            principal_out: self.principal_out,
            liability_delta: self.liability_delta,
        })
    }
}

/// A committed changeset that can still be reverted.
#[derive(Debug)]
#[must_use = "a committed changeset must be kept until the transfer settles"]
pub struct Committed {
    account: AccountId,
    position_before: StakePosition,
    position_after: StakePosition,
    principal_in: u128,
    principal_out: u128,
    liability_delta: i128,
}

impl Committed {
    /// Take this commit's changes back out of the store.
    ///
    /// The totals are adjusted by the inverse of this commit's deltas against
    /// their current values. The position is restored only if it still holds
    /// what this commit wrote; otherwise nothing is written and
    /// [`LedgerError::RollbackConflict`] is returned.
    pub fn revert<S>(self, store: &S) -> Result<(), LedgerError>
    where
        S: PositionStore + TotalsStore + BatchStore,
    {
        if store.get_position(&self.account)? != self.position_after {
            return Err(LedgerError::RollbackConflict(self.account));
        }
        let mut totals = store.get_totals()?;
        totals.total_principal = totals
            .total_principal
            .checked_sub(self.principal_in)
            .and_then(|p| p.checked_add(self.principal_out))
            .ok_or_else(|| LedgerError::RollbackConflict(self.account.clone()))?;
        totals.total_reward_liability = totals
            .total_reward_liability
            .checked_sub(self.liability_delta)
            .ok_or_else(|| LedgerError::RollbackConflict(self.account.clone()))?;

        let mut batch = WriteBatch::new();
        batch
            .put_position(&self.account, self.position_before)
            .put_totals(totals);
        store.apply_batch(&batch)?;
        Ok(())
    }

    /// Keep the committed state.
    pub fn settle(self) {}
}
