use stake_types::AccountId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupt record under {key}: {reason}")]
    Corruption { key: String, reason: String },

    #[error("insufficient balance in {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: AccountId,
        needed: u128,
        available: u128,
    },

    #[error("balance overflow for {0}")]
    BalanceOverflow(AccountId),

    #[error("unsupported schema: {0}")]
    Schema(String),
}

impl From<heed::Error> for LmdbError {
    fn from(e: heed::Error) -> Self {
        LmdbError::Heed(e.to_string())
    }
}

impl From<bincode::Error> for LmdbError {
    fn from(e: bincode::Error) -> Self {
        LmdbError::Serialization(e.to_string())
    }
}

impl From<LmdbError> for stake_store::StoreError {
    fn from(e: LmdbError) -> Self {
        use stake_store::StoreError;
        match e {
            LmdbError::Serialization(msg) => StoreError::Serialization(msg),
            e @ LmdbError::Corruption { .. } => StoreError::Corruption(e.to_string()),
            e => StoreError::Backend(e.to_string()),
        }
    }
}
