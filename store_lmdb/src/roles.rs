use stake_store::{RoleStore, StoreError};
use stake_types::{AccountId, TierSet};

use crate::environment::{account_key, decode_account};
use crate::{LmdbEnvironment, LmdbError};

// One byte per account: bit 0 administrator, bit 1 participant.
const ADMINISTRATOR_BIT: u8 = 0b01;
const PARTICIPANT_BIT: u8 = 0b10;

fn encode(tiers: &TierSet) -> u8 {
    let mut byte = 0;
    if tiers.administrator {
        byte |= ADMINISTRATOR_BIT;
    }
    if tiers.participant {
        byte |= PARTICIPANT_BIT;
    }
    byte
}

fn decode(key: &[u8], bytes: &[u8]) -> Result<TierSet, LmdbError> {
    match bytes {
        [byte] if byte & !(ADMINISTRATOR_BIT | PARTICIPANT_BIT) == 0 => Ok(TierSet {
            administrator: byte & ADMINISTRATOR_BIT != 0,
            participant: byte & PARTICIPANT_BIT != 0,
        }),
        _ => Err(LmdbError::Corruption {
            key: String::from_utf8_lossy(key).into_owned(),
            reason: format!("invalid tier record {bytes:?}"),
        }),
    }
}

impl RoleStore for LmdbEnvironment {
    fn get_tiers(&self, account: &AccountId) -> Result<TierSet, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let key = account_key(account);
        match self.roles_db.get(&rtxn, key).map_err(LmdbError::from)? {
            Some(bytes) => Ok(decode(key, bytes)?),
            None => Ok(TierSet::default()),
        }
    }

    fn put_tiers(&self, account: &AccountId, tiers: &TierSet) -> Result<(), StoreError> {
        let mut wtxn = self.env().write_txn().map_err(LmdbError::from)?;
        let key = account_key(account);
        if tiers.is_empty() {
            self.roles_db
                .delete(&mut wtxn, key)
                .map_err(LmdbError::from)?;
        } else {
            self.roles_db
                .put(&mut wtxn, key, &[encode(tiers)])
                .map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn iter_tiers(&self) -> Result<Vec<(AccountId, TierSet)>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for item in self.roles_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (key, val) = item.map_err(LmdbError::from)?;
            results.push((decode_account(key)?, decode(key, val)?));
        }
        Ok(results)
    }
}
