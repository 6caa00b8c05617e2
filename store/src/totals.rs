//! Aggregate counter storage.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The two ledger-wide running totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of principal over all open positions.
    pub total_principal: u128,
    /// Reward recognized minus reward paid. Signed: settlement recognizes
    /// nothing up front, so payouts drive it below zero.
    pub total_reward_liability: i128,
}

/// Storage for the aggregate counters.
pub trait TotalsStore {
    /// Current totals; zero for a fresh store.
    fn get_totals(&self) -> Result<Totals, StoreError>;

    fn put_totals(&self, totals: &Totals) -> Result<(), StoreError>;
}

impl<T: TotalsStore + ?Sized> TotalsStore for Arc<T> {
    fn get_totals(&self) -> Result<Totals, StoreError> {
        (**self).get_totals()
    }

    fn put_totals(&self, totals: &Totals) -> Result<(), StoreError> {
        (**self).put_totals(totals)
    }
}
