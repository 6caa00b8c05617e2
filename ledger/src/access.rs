//! Capability checks.
//!
//! Authorization is a standalone check the controller calls at the top of
//! every operation. It knows nothing about positions or counters.

use stake_store::{RoleStore, StoreError};
use stake_types::{AccountId, Tier};
use thiserror::Error;

use crate::LedgerError;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("account {account} lacks the {required} tier")]
    Denied { account: AccountId, required: Tier },

    #[error("role lookup failed: {0}")]
    Store(#[from] StoreError),
}

impl From<AccessError> for LedgerError {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::Denied { account, required } => {
                LedgerError::Unauthorized { account, required }
            }
            AccessError::Store(e) => LedgerError::Store(e),
        }
    }
}

/// Decides whether a caller holds a tier.
pub trait Authorizer {
    fn authorize(&self, caller: &AccountId, required: Tier) -> Result<(), AccessError>;
}

/// Authorizer backed by the persisted tier mapping.
pub struct RoleAuthorizer<R> {
    roles: R,
}

impl<R: RoleStore> RoleAuthorizer<R> {
    pub fn new(roles: R) -> Self {
        Self { roles }
    }
}

impl<R: RoleStore> Authorizer for RoleAuthorizer<R> {
    fn authorize(&self, caller: &AccountId, required: Tier) -> Result<(), AccessError> {
        if self.roles.get_tiers(caller)?.contains(required) {
            Ok(())
        } else {
            Err(AccessError::Denied {
                account: caller.clone(),
                required,
            })
        }
    }
}

impl<F> Authorizer for F
where
    F: Fn(&AccountId, Tier) -> bool,
{
    fn authorize(&self, caller: &AccountId, required: Tier) -> Result<(), AccessError> {
        if self(caller, required) {
            Ok(())
        } else {
            Err(AccessError::Denied {
                account: caller.clone(),
                required,
            })
        }
    }
}
