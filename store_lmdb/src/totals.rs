//! Aggregate counters and metadata, both kept in the `meta` database.

use stake_store::{MetaStore, StoreError, Totals, TotalsStore};

use crate::{LmdbEnvironment, LmdbError};

pub(crate) const TOTALS_KEY: &[u8] = b"totals";

impl TotalsStore for LmdbEnvironment {
    fn get_totals(&self) -> Result<Totals, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        match self.meta_db.get(&rtxn, TOTALS_KEY).map_err(LmdbError::from)? {
            Some(bytes) => Ok(bincode::deserialize(bytes).map_err(LmdbError::from)?),
            None => Ok(Totals::default()),
        }
    }

    fn put_totals(&self, totals: &Totals) -> Result<(), StoreError> {
        let bytes = bincode::serialize(totals).map_err(LmdbError::from)?;
        let mut wtxn = self.env().write_txn().map_err(LmdbError::from)?;
        self.meta_db
            .put(&mut wtxn, TOTALS_KEY, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

impl MetaStore for LmdbEnvironment {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env().write_txn().map_err(LmdbError::from)?;
        self.meta_db
            .put(&mut wtxn, key.as_bytes(), value)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        Ok(self
            .meta_db
            .get(&rtxn, key.as_bytes())
            .map_err(LmdbError::from)?
            .map(|bytes| bytes.to_vec()))
    }
}
