//! Local balance book.
//!
//! Holds the fungible-unit balances that the command-line custody gateway
//! moves between participants and the vault. Values are 16-byte big-endian.

use heed::RwTxn;
use stake_types::AccountId;

use crate::environment::{account_key, decode_account};
use crate::{LmdbEnvironment, LmdbError};

fn decode_amount(key: &[u8], bytes: &[u8]) -> Result<u128, LmdbError> {
    let raw: [u8; 16] = bytes.try_into().map_err(|_| LmdbError::Corruption {
        key: String::from_utf8_lossy(key).into_owned(),
        reason: format!("balance has {} bytes, expected 16", bytes.len()),
    })?;
    Ok(u128::from_be_bytes(raw))
}

impl LmdbEnvironment {
    /// Balance of `account`, zero if it has never held anything.
    pub fn balance(&self, account: &AccountId) -> Result<u128, LmdbError> {
        let rtxn = self.env().read_txn()?;
        let key = account_key(account);
        match self.balances_db.get(&rtxn, key)? {
            Some(bytes) => decode_amount(key, bytes),
            None => Ok(0),
        }
    }

    /// Every account with a recorded balance.
    pub fn balances(&self) -> Result<Vec<(AccountId, u128)>, LmdbError> {
        let rtxn = self.env().read_txn()?;
        let mut results = Vec::new();
        for item in self.balances_db.iter(&rtxn)? {
            let (key, val) = item?;
            results.push((decode_account(key)?, decode_amount(key, val)?));
        }
        Ok(results)
    }

    /// Mint `amount` into `account`.
    pub fn credit(&self, account: &AccountId, amount: u128) -> Result<u128, LmdbError> {
        let mut wtxn = self.env().write_txn()?;
        let current = self.read_balance(&wtxn, account)?;
        let updated = current
            .checked_add(amount)
            .ok_or_else(|| LmdbError::BalanceOverflow(account.clone()))?;
        self.write_balance(&mut wtxn, account, updated)?;
        wtxn.commit()?;
        Ok(updated)
    }

    /// Move `amount` from one account to another in one transaction.
    pub fn transfer_balance(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), LmdbError> {
        let mut wtxn = self.env().write_txn()?;
        let available = self.read_balance(&wtxn, from)?;
        if available < amount {
            return Err(LmdbError::InsufficientBalance {
                account: from.clone(),
                needed: amount,
                available,
            });
        }
        self.write_balance(&mut wtxn, from, available - amount)?;
        let credited = self
            .read_balance(&wtxn, to)?
            .checked_add(amount)
            .ok_or_else(|| LmdbError::BalanceOverflow(to.clone()))?;
        self.write_balance(&mut wtxn, to, credited)?;
        wtxn.commit()?;
        Ok(())
    }

    fn read_balance(&self, txn: &RwTxn<'_>, account: &AccountId) -> Result<u128, LmdbError> {
        let key = account_key(account);
        match self.balances_db.get(txn, key)? {
            Some(bytes) => decode_amount(key, bytes),
            None => Ok(0),
        }
    }

    fn write_balance(
        &self,
        txn: &mut RwTxn<'_>,
        account: &AccountId,
        amount: u128,
    ) -> Result<(), LmdbError> {
        self.balances_db
            .put(txn, account_key(account), &amount.to_be_bytes())?;
        Ok(())
    }
}
