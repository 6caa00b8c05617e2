//! Nullable custody: an in-memory balance book with failure injection.

use stake_ledger::{CustodyError, CustodyGateway};
use stake_types::AccountId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Mutex;

type TransferHook = Box<dyn Fn(&AccountId, &AccountId, u128)>;

/// One successful transfer, in the order it happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRecord {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: u128,
}

/// A custody gateway backed by an in-memory balance map.
///
/// Transfers debit and credit atomically. Failures can be injected for the
/// next call or for every call, and a hook can observe (or re-enter the
/// ledger from) each transfer before it moves funds.
#[derive(Default)]
pub struct NullCustody {
    balances: Mutex<HashMap<AccountId, u128>>,
    log: Mutex<Vec<TransferRecord>>,
    fail_next: Mutex<bool>,
    always_fail: Mutex<bool>,
    hook: RefCell<Option<TransferHook>>,
}

impl NullCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint `amount` into `account`.
    pub fn deposit(&self, account: &AccountId, amount: u128) {
        *self
            .balances
            .lock()
            .unwrap()
            .entry(account.clone())
            .or_default() += amount;
    }

    pub fn balance_of(&self, account: &AccountId) -> u128 {
        self.balances
            .lock()
            .unwrap()
            .get(account)
            .copied()
            .unwrap_or(0)
    }

    /// Reject the next transfer only.
    pub fn fail_next(&self) {
        *self.fail_next.lock().unwrap() = true;
    }

    /// Reject every transfer until turned off.
    pub fn set_failing(&self, failing: bool) {
        *self.always_fail.lock().unwrap() = failing;
    }

    /// Run `hook` at the start of every transfer, before any check.
    pub fn on_transfer(&self, hook: impl Fn(&AccountId, &AccountId, u128) + 'static) {
        *self.hook.borrow_mut() = Some(Box::new(hook));
    }

    pub fn transfers(&self) -> Vec<TransferRecord> {
        self.log.lock().unwrap().clone()
    }
}

impl CustodyGateway for NullCustody {
    fn transfer(&self, from: &AccountId, to: &AccountId, amount: u128) -> Result<(), CustodyError> {
        if let Some(hook) = self.hook.borrow().as_ref() {
            hook(from, to, amount);
        }

        let injected = std::mem::take(&mut *self.fail_next.lock().unwrap());
        if injected || *self.always_fail.lock().unwrap() {
            return Err(CustodyError::Rejected("injected failure".into()));
        }

        let mut balances = self.balances.lock().unwrap();
        let available = balances.get(from).copied().unwrap_or(0);
        if available < amount {
            return Err(CustodyError::InsufficientBalance {
                account: from.clone(),
                needed: amount,
                available,
            });
        }
        balances.insert(from.clone(), available - amount);
        *balances.entry(to.clone()).or_default() += amount;
        drop(balances);

        self.log.lock().unwrap().push(TransferRecord {
            from: from.clone(),
            to: to.clone(),
            amount,
        });
        Ok(())
    }
}
