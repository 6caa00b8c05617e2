//! Abstract storage traits for the stake ledger.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The ledger controller depends only on the traits.

pub mod batch;
pub mod error;
pub mod meta;
pub mod position;
pub mod roles;
pub mod totals;

pub use batch::{BatchOp, BatchStore, WriteBatch};
pub use error::StoreError;
pub use meta::MetaStore;
pub use position::PositionStore;
pub use roles::RoleStore;
pub use totals::{Totals, TotalsStore};

/// Everything the ledger controller needs from its backing store.
pub trait LedgerStore: PositionStore + TotalsStore + RoleStore + BatchStore {}

impl<T> LedgerStore for T where T: PositionStore + TotalsStore + RoleStore + BatchStore {}
