//! LMDB storage backend for the stake ledger.
//!
//! Implements all storage traits from `stake-store` using the `heed` LMDB
//! bindings. Each logical store maps to one LMDB database within a single
//! environment; the aggregate counters and schema version share `meta`.

pub mod balances;
pub mod environment;
pub mod error;
pub mod integrity;
pub mod migration;
pub mod position;
pub mod roles;
pub mod totals;
pub mod write_batch;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use integrity::{check_data_dir, IntegrityReport};
pub use migration::{Migrator, CURRENT_SCHEMA_VERSION};
