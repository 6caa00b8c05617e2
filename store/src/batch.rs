//! Atomic multi-record writes.

use crate::{StoreError, Totals};
use stake_types::{AccountId, StakePosition};
use std::sync::Arc;

/// One staged write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOp {
    PutPosition {
        account: AccountId,
        position: StakePosition,
    },
    PutTotals(Totals),
}

/// An ordered group of writes applied all-or-nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_position(&mut self, account: &AccountId, position: StakePosition) -> &mut Self {
        self.ops.push(BatchOp::PutPosition {
            account: account.clone(),
            position,
        });
        self
    }

    pub fn put_totals(&mut self, totals: Totals) -> &mut Self {
        self.ops.push(BatchOp::PutTotals(totals));
        self
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }
}

/// Stores that can apply a [`WriteBatch`] atomically.
pub trait BatchStore {
    /// Apply every op or none of them.
    fn apply_batch(&self, batch: &WriteBatch) -> Result<(), StoreError>;
}

impl<T: BatchStore + ?Sized> BatchStore for Arc<T> {
    fn apply_batch(&self, batch: &WriteBatch) -> Result<(), StoreError> {
        (**self).apply_batch(batch)
    }
}
