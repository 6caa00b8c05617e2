use stake_store::{PositionStore, StoreError};
use stake_types::{AccountId, StakePosition};

use crate::environment::{account_key, decode_account};
use crate::{LmdbEnvironment, LmdbError};

impl PositionStore for LmdbEnvironment {
    fn get_position(&self, account: &AccountId) -> Result<StakePosition, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        match self
            .positions_db
            .get(&rtxn, account_key(account))
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(bincode::deserialize(bytes).map_err(LmdbError::from)?),
            None => Ok(StakePosition::default()),
        }
    }

    fn put_position(
        &self,
        account: &AccountId,
        position: &StakePosition,
    ) -> Result<(), StoreError> {
        let bytes = bincode::serialize(position).map_err(LmdbError::from)?;
        let mut wtxn = self.env().write_txn().map_err(LmdbError::from)?;
        self.positions_db
            .put(&mut wtxn, account_key(account), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn iter_positions(&self) -> Result<Vec<(AccountId, StakePosition)>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for item in self.positions_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (key, val) = item.map_err(LmdbError::from)?;
            let position: StakePosition = bincode::deserialize(val).map_err(LmdbError::from)?;
            results.push((decode_account(key)?, position));
        }
        Ok(results)
    }
}
