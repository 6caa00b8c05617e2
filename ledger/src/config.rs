//! Ledger configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use stake_types::{AccountId, LedgerParams};

use crate::LedgerError;

/// Configuration for a ledger deployment.
///
/// Can be loaded from a TOML file via [`LedgerConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in MiB.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    /// Account that holds staked principal while positions are open.
    #[serde(default = "default_vault")]
    pub vault: AccountId,

    /// Administrator granted on first start, if the ledger has none.
    #[serde(default)]
    pub admin: Option<AccountId>,

    /// Minimum transaction price accepted by mutating operations.
    #[serde(default)]
    pub min_fee: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Reward formula and penalty constants.
    #[serde(default)]
    pub params: LedgerParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./stake_data")
}

fn default_map_size_mb() -> usize {
    64
}

fn default_vault() -> AccountId {
    AccountId::new("vault")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl LedgerConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| LedgerError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, LedgerError> {
        let config: Self = toml::from_str(s).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, LedgerError> {
        toml::to_string_pretty(self).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Reject parameter sets the reward engine cannot evaluate.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if AccountId::parse(self.vault.as_str()).is_err() {
            return Err(LedgerError::Config("vault identity is invalid".into()));
        }
        if self.params.rate_divisor == 0 || self.params.seconds_per_year == 0 {
            return Err(LedgerError::Config(
                "rate_divisor and seconds_per_year must be non-zero".into(),
            ));
        }
        if self.params.reward_scale == 0 {
            return Err(LedgerError::Config("reward_scale must be non-zero".into()));
        }
        if self.params.emergency_penalty_pct > 100 {
            return Err(LedgerError::Config(
                "emergency_penalty_pct cannot exceed 100".into(),
            ));
        }
        Ok(())
    }

    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size_mb: default_map_size_mb(),
            vault: default_vault(),
            admin: None,
            min_fee: 0,
            log_format: default_log_format(),
            log_level: default_log_level(),
            params: LedgerParams::default(),
        }
    }
}
