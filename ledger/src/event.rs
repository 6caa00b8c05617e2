//! Notifications emitted after each successful operation.

use serde::Serialize;
use stake_types::{AccountId, Timestamp};

/// Observational record of a committed operation. The ledger never reads these back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A position was opened and its principal pulled into custody.
    PositionOpened {
        account: AccountId,
        principal: u128,
        term_months: u32,
        at: Timestamp,
    },
    /// A position was closed, normally or in an emergency.
    PositionClosed {
        account: AccountId,
        principal: u128,
        reward: u128,
        penalty: u128,
        emergency: bool,
        at: Timestamp,
    },
    /// Accrued reward was paid out and the accrual checkpoint reset.
    RewardSettled {
        account: AccountId,
        reward: u128,
        at: Timestamp,
    },
    /// An open position's term was lengthened.
    TermExtended {
        account: AccountId,
        added_months: u32,
        term_months: u32,
        at: Timestamp,
    },
}

impl LedgerEvent {
    pub fn account(&self) -> &AccountId {
        match self {
            LedgerEvent::PositionOpened { account, .. }
            | LedgerEvent::PositionClosed { account, .. }
            | LedgerEvent::RewardSettled { account, .. }
            | LedgerEvent::TermExtended { account, .. } => account,
        }
    }
}

/// Synchronous fan-out event bus for ledger events.
///
/// Listeners are invoked inline on the emitting thread, after the operation
/// has fully settled.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&LedgerEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &LedgerEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
