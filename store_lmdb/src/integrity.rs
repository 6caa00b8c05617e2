//! Startup integrity checks.
//!
//! Decodes every stored record so corruption surfaces before the ledger
//! starts accepting operations.

use std::path::Path;

use serde::Serialize;
use stake_store::Totals;
use stake_types::StakePosition;

use crate::environment::decode_account;
use crate::totals::TOTALS_KEY;
use crate::{LmdbEnvironment, LmdbError};

/// Summary of an integrity check run.
#[derive(Debug, Default, Serialize)]
pub struct IntegrityReport {
    pub databases_checked: u32,
    pub total_entries: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    /// Returns `true` if no errors were detected.
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

impl LmdbEnvironment {
    /// Decode every key and value. Read failures are recorded in the report
    /// rather than returned, so one bad record does not hide the others.
    pub fn check_integrity(&self) -> Result<IntegrityReport, LmdbError> {
        let mut report = IntegrityReport::default();
        let rtxn = self.env().read_txn()?;

        report.databases_checked += 1;
        for item in self.positions_db.iter(&rtxn)? {
            let (key, val) = item?;
            report.total_entries += 1;
            if let Err(e) = decode_account(key) {
                report.errors.push(format!("positions: {e}"));
            }
            if let Err(e) = bincode::deserialize::<StakePosition>(val) {
                report
                    .errors
                    .push(format!("positions/{}: {e}", String::from_utf8_lossy(key)));
            }
        }

        report.databases_checked += 1;
        for item in self.roles_db.iter(&rtxn)? {
            let (key, val) = item?;
            report.total_entries += 1;
            if decode_account(key).is_err() || val.len() != 1 {
                report
                    .errors
                    .push(format!("roles/{}: malformed", String::from_utf8_lossy(key)));
            }
        }

        report.databases_checked += 1;
        for item in self.balances_db.iter(&rtxn)? {
            let (key, val) = item?;
            report.total_entries += 1;
            if decode_account(key).is_err() || val.len() != 16 {
                report
                    .errors
                    .push(format!("balances/{}: malformed", String::from_utf8_lossy(key)));
            }
        }

        report.databases_checked += 1;
        report.total_entries += self.meta_db.len(&rtxn)?;
        if let Some(bytes) = self.meta_db.get(&rtxn, TOTALS_KEY)? {
            if let Err(e) = bincode::deserialize::<Totals>(bytes) {
                report.errors.push(format!("meta/totals: {e}"));
            }
        }

        if !report.is_healthy() {
            tracing::warn!(errors = report.errors.len(), "integrity check found problems");
        }
        Ok(report)
    }
}

/// Check that an existing data directory holds an LMDB environment.
///
/// A directory that does not exist yet is a fresh start. An existing
/// directory without `data.mdb` suggests a wrong path or a damaged store.
pub fn check_data_dir(path: &Path) -> Result<(), LmdbError> {
    if !path.exists() {
        return Ok(());
    }
    let has_entries = path
        .read_dir()
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false);
    if has_entries && !path.join("data.mdb").exists() {
        return Err(LmdbError::Heed(format!(
            "{} is not empty but holds no data.mdb",
            path.display()
        )));
    }
    Ok(())
}
