//! Stake ledger controller.
//!
//! Accepts deposits into fixed-term positions, accrues reward at a fixed
//! annual rate and releases principal plus reward (or a penalized principal)
//! on close. Every operation is all-or-nothing: bookkeeping is committed
//! before the custody transfer and reverted if the transfer fails.

pub mod access;
pub mod changeset;
pub mod config;
pub mod controller;
pub mod custody;
pub mod error;
pub mod event;
pub mod fee;
pub mod guard;

pub use access::{AccessError, Authorizer, RoleAuthorizer};
pub use changeset::{Changeset, Committed};
pub use config::LedgerConfig;
pub use controller::{CallContext, Receipt, SolvencyReport, StakeLedger};
pub use custody::{CustodyError, CustodyGateway};
pub use error::LedgerError;
pub use event::{EventBus, LedgerEvent};
pub use fee::FeeGate;
pub use guard::{GuardToken, Operation, ReentrancyGuard};
