//! LMDB environment setup.

use std::path::Path;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use stake_types::AccountId;

use crate::LmdbError;

/// Named databases, in creation order.
pub(crate) const DATABASES: &[&str] = &["positions", "roles", "meta", "balances"];

/// Wraps the LMDB environment and all database handles.
///
/// Implements every `stake-store` trait, so one handle (usually behind an
/// `Arc`) serves as the ledger's backing store.
pub struct LmdbEnvironment {
    env: Env,
    pub(crate) positions_db: Database<Bytes, Bytes>,
    pub(crate) roles_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
    pub(crate) balances_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)
            .map_err(|e| LmdbError::Heed(format!("{}: {e}", path.display())))?;

        // SAFETY: the environment is opened once per path by this process and
        // the memory map is never accessed outside heed's transactions.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(DATABASES.len() as u32)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let positions_db = env.create_database(&mut wtxn, Some("positions"))?;
        let roles_db = env.create_database(&mut wtxn, Some("roles"))?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        let balances_db = env.create_database(&mut wtxn, Some("balances"))?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), map_size, "LMDB environment opened");
        Ok(Self {
            env,
            positions_db,
            roles_db,
            meta_db,
            balances_db,
        })
    }

    pub(crate) fn env(&self) -> &Env {
        &self.env
    }

    /// Flush the memory map to disk.
    pub fn sync(&self) -> Result<(), LmdbError> {
        self.env.force_sync()?;
        Ok(())
    }
}

pub(crate) fn account_key(account: &AccountId) -> &[u8] {
    account.as_bytes()
}

pub(crate) fn decode_account(key: &[u8]) -> Result<AccountId, LmdbError> {
    let s = std::str::from_utf8(key).map_err(|e| LmdbError::Corruption {
        key: String::from_utf8_lossy(key).into_owned(),
        reason: e.to_string(),
    })?;
    AccountId::parse(s).map_err(|e| LmdbError::Corruption {
        key: s.to_string(),
        reason: e.to_string(),
    })
}
