//! Errors raised while constructing fundamental types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid term: {0} months (allowed: 1, 3, 6, 12)")]
    InvalidTerm(u32),

    #[error("invalid account identity: {0}")]
    InvalidAccount(String),

    #[error("unknown tier: {0}")]
    UnknownTier(String),
}
