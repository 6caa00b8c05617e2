//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the ledger (clock, storage, custody) is
//! abstracted behind a trait. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod custody;
pub mod store;

pub use clock::NullClock;
pub use custody::{NullCustody, TransferRecord};
pub use store::NullStore;
