//! Shared utilities for the stake ledger.

pub mod logging;
pub mod time;

pub use logging::{init_logging, LogFormat, LogFormatError};
pub use time::{format_duration, format_maturity};
