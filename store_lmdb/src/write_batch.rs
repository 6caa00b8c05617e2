//! Write batching: applies a staged [`WriteBatch`] in a single LMDB write
//! transaction.
//!
//! If any put fails the transaction is dropped without commit and LMDB
//! aborts it, so either every op in the batch lands or none does.

use stake_store::{BatchOp, BatchStore, StoreError, WriteBatch};

use crate::environment::account_key;
use crate::totals::TOTALS_KEY;
use crate::{LmdbEnvironment, LmdbError};

impl BatchStore for LmdbEnvironment {
    fn apply_batch(&self, batch: &WriteBatch) -> Result<(), StoreError> {
        let mut wtxn = self.env().write_txn().map_err(LmdbError::from)?;
        for op in batch.ops() {
            match op {
                BatchOp::PutPosition { account, position } => {
                    let bytes = bincode::serialize(position).map_err(LmdbError::from)?;
                    self.positions_db
                        .put(&mut wtxn, account_key(account), &bytes)
                        .map_err(LmdbError::from)?;
                }
                BatchOp::PutTotals(totals) => {
                    let bytes = bincode::serialize(totals).map_err(LmdbError::from)?;
                    self.meta_db
                        .put(&mut wtxn, TOTALS_KEY, &bytes)
                        .map_err(LmdbError::from)?;
                }
            }
        }
        wtxn.commit().map_err(LmdbError::from)?;
        tracing::trace!(ops = batch.len(), "write batch committed");
        Ok(())
    }
}
