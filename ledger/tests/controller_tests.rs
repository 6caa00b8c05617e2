//! End-to-end tests of the ledger controller over nullable infrastructure:
//! authorization → fee gate → preconditions → commit → custody → events.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use stake_ledger::{
    CallContext, CustodyError, LedgerError, LedgerEvent, Operation, Receipt, RoleAuthorizer,
    StakeLedger,
};
use stake_nullables::{NullClock, NullCustody, NullStore};
use stake_store::{PositionStore, RoleStore, Totals, TotalsStore};
use stake_types::{AccountId, LedgerParams, StakePosition, Tier, Timestamp};

const DAY: u64 = 86_400;
const MONTH: u64 = 30 * DAY;
const T0: u64 = 1_700_000_000;
const RESERVE: u128 = 1_000_000;
const WALLET: u128 = 10_000;

type TestLedger = StakeLedger<
    Arc<NullStore>,
    Arc<NullCustody>,
    Arc<NullClock>,
    RoleAuthorizer<Arc<NullStore>>,
>;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Harness {
    store: Arc<NullStore>,
    custody: Arc<NullCustody>,
    clock: Arc<NullClock>,
    events: Arc<Mutex<Vec<LedgerEvent>>>,
    ledger: TestLedger,
}

fn acct(name: &str) -> AccountId {
    AccountId::new(name)
}

fn ctx(name: &str) -> CallContext {
    CallContext::new(acct(name), 0)
}

fn vault() -> AccountId {
    acct("vault")
}

/// root administers; alice and carol participate; bob holds no tier.
fn harness() -> Harness {
    let store = Arc::new(NullStore::new());
    let custody = Arc::new(NullCustody::new());
    let clock = Arc::new(NullClock::new(T0));
    let mut ledger = StakeLedger::new(
        Arc::clone(&store),
        Arc::clone(&custody),
        Arc::clone(&clock),
        RoleAuthorizer::new(Arc::clone(&store)),
        vault(),
        LedgerParams::default(),
    );

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    ledger.subscribe(Box::new(move |e| sink.lock().unwrap().push(e.clone())));

    ledger.initialize(&acct("root")).expect("first initialize");
    for name in ["alice", "carol"] {
        ledger
            .grant_role(&ctx("root"), &acct(name), Tier::Participant)
            .expect("grant participant");
        custody.deposit(&acct(name), WALLET);
    }
    custody.deposit(&acct("bob"), WALLET);
    custody.deposit(&vault(), RESERVE);

    Harness {
        store,
        custody,
        clock,
        events,
        ledger,
    }
}

impl Harness {
    fn balance(&self, name: &str) -> u128 {
        self.custody.balance_of(&acct(name))
    }

    fn totals(&self) -> Totals {
        self.store.get_totals().unwrap()
    }

    fn position(&self, name: &str) -> StakePosition {
        self.store.get_position(&acct(name)).unwrap()
    }

    fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

// ---------------------------------------------------------------------------
// 1. Normal lifecycle
// ---------------------------------------------------------------------------

#[test]
fn thirty_day_position_pays_principal_plus_reward() {
    let h = harness();
    let alice = ctx("alice");

    let opened = h.ledger.open(&alice, 1, 1000).unwrap();
    assert_eq!(opened.payout, 1000);
    assert_eq!(h.balance("alice"), WALLET - 1000);
    assert_eq!(h.balance("vault"), RESERVE + 1000);
    assert_eq!(
        h.totals(),
        Totals {
            total_principal: 1000,
            total_reward_liability: 0,
        }
    );
    assert_eq!(
        h.position("alice"),
        StakePosition {
            principal: 1000,
            start_time: Timestamp::new(T0),
            term_months: 1,
            active: true,
        }
    );

    h.clock.advance(MONTH);
    assert_eq!(h.ledger.pending_reward(&acct("alice")).unwrap(), 226);
    let closed = h.ledger.close(&alice).unwrap();
    assert_eq!(closed.reward, 226);
    assert_eq!(closed.payout, 1226);
    assert_eq!(h.balance("alice"), WALLET + 226);
    assert_eq!(h.balance("vault"), RESERVE - 226);
    assert_eq!(
        h.totals(),
        Totals {
            total_principal: 0,
            total_reward_liability: -226,
        }
    );

    let record = h.position("alice");
    assert!(!record.active);
    assert_eq!(record.principal, 0);
    assert_eq!(record.term_months, 1);
    assert_eq!(record.start_time, Timestamp::new(T0));
}

#[test]
fn close_is_gated_on_term_to_the_second() {
    let h = harness();
    let alice = ctx("alice");
    h.ledger.open(&alice, 1, 1000).unwrap();

    h.clock.advance(MONTH - 1);
    match h.ledger.close(&alice) {
        Err(LedgerError::TermNotElapsed { matures_at, now }) => {
            assert_eq!(matures_at, Timestamp::new(T0 + MONTH));
            assert_eq!(now, Timestamp::new(T0 + MONTH - 1));
        }
        other => panic!("expected TermNotElapsed, got {other:?}"),
    }
    assert!(h.position("alice").active);

    h.clock.advance(1);
    assert!(h.ledger.close(&alice).is_ok());
}

#[test]
fn emergency_close_withholds_ten_percent_and_skips_reward() {
    let h = harness();
    let alice = ctx("alice");
    h.ledger.open(&alice, 12, 1000).unwrap();
    h.clock.advance(10 * DAY);

    let receipt = h.ledger.close_emergency(&alice).unwrap();
    assert_eq!(receipt.penalty, 100);
    assert_eq!(receipt.payout, 900);
    assert_eq!(receipt.reward, 0);
    assert_eq!(h.balance("alice"), WALLET - 100);
    assert_eq!(h.balance("vault"), RESERVE + 100);
    // Liability untouched.
    assert_eq!(h.totals(), Totals::default());
    assert!(!h.position("alice").active);
}

#[test]
fn position_can_be_reopened_after_close() {
    let h = harness();
    let alice = ctx("alice");
    h.ledger.open(&alice, 1, 1000).unwrap();
    h.ledger.close_emergency(&alice).unwrap();
    h.ledger.open(&alice, 3, 500).unwrap();
    let pos = h.position("alice");
    assert_eq!(pos.principal, 500);
    assert_eq!(pos.term_months, 3);
    assert_eq!(h.totals().total_principal, 500);
}

// ---------------------------------------------------------------------------
// 2. Precondition failures
// ---------------------------------------------------------------------------

#[test]
fn open_rejects_bad_input_in_order() {
    let h = harness();
    let alice = ctx("alice");
    assert!(matches!(
        h.ledger.open(&alice, 2, 0),
        Err(LedgerError::InvalidTerm(2))
    ));
    assert!(matches!(
        h.ledger.open(&alice, 1, 0),
        Err(LedgerError::InvalidAmount)
    ));

    h.ledger.open(&alice, 6, 1000).unwrap();
    assert!(matches!(
        h.ledger.open(&alice, 1, 50),
        Err(LedgerError::PositionAlreadyOpen(_))
    ));
    assert_eq!(h.totals().total_principal, 1000);
    assert_eq!(h.custody.transfers().len(), 1);
    assert_eq!(h.event_count(), 1);
}

#[test]
fn operations_without_a_position_fail() {
    let h = harness();
    let alice = ctx("alice");
    assert!(matches!(
        h.ledger.close(&alice),
        Err(LedgerError::NoActivePosition(_))
    ));
    assert!(matches!(
        h.ledger.close_emergency(&alice),
        Err(LedgerError::NoActivePosition(_))
    ));
    assert!(matches!(
        h.ledger.withdraw_reward(&alice),
        Err(LedgerError::NoActivePosition(_))
    ));
    // Term validity is checked before the position.
    assert!(matches!(
        h.ledger.extend_term(&alice, 5),
        Err(LedgerError::InvalidTerm(5))
    ));
    assert!(matches!(
        h.ledger.extend_term(&alice, 3),
        Err(LedgerError::NoActivePosition(_))
    ));
    assert!(h.custody.transfers().is_empty());
}

#[test]
fn second_close_fails_after_first_succeeds() {
    let h = harness();
    let alice = ctx("alice");
    h.ledger.open(&alice, 1, 1000).unwrap();
    h.clock.advance(MONTH);
    h.ledger.close(&alice).unwrap();
    let balance = h.balance("alice");
    assert!(matches!(
        h.ledger.close(&alice),
        Err(LedgerError::NoActivePosition(_))
    ));
    assert_eq!(h.balance("alice"), balance);
}

// ---------------------------------------------------------------------------
// 3. Term extension and reward withdrawal
// ---------------------------------------------------------------------------

#[test]
fn extend_term_moves_maturity() {
    let h = harness();
    let alice = ctx("alice");
    h.ledger.open(&alice, 1, 1000).unwrap();

    let receipt = h.ledger.extend_term(&alice, 3).unwrap();
    assert_eq!(receipt.term_months, 4);
    assert_eq!(receipt.payout, 0);
    assert!(matches!(
        h.ledger.extend_term(&alice, 2),
        Err(LedgerError::InvalidTerm(2))
    ));

    h.clock.advance(MONTH);
    assert!(matches!(
        h.ledger.close(&alice),
        Err(LedgerError::TermNotElapsed { .. })
    ));
    h.clock.advance(3 * MONTH);
    let closed = h.ledger.close(&alice).unwrap();
    // 1000 × 275 × 120 days / (100 × year) = 904.1
    assert_eq!(closed.reward, 904);
}

#[test]
fn extended_term_is_not_revalidated() {
    let h = harness();
    let alice = ctx("alice");
    h.ledger.open(&alice, 12, 1000).unwrap();
    h.ledger.extend_term(&alice, 12).unwrap();
    assert_eq!(h.position("alice").term_months, 24);
    assert_eq!(h.totals().total_principal, 1000);
}

#[test]
fn withdraw_reward_resets_the_checkpoint() {
    let h = harness();
    let alice = ctx("alice");
    h.ledger.open(&alice, 1, 1000).unwrap();
    assert!(matches!(
        h.ledger.withdraw_reward(&alice),
        Err(LedgerError::NoRewardDue)
    ));

    h.clock.advance(MONTH);
    let receipt = h.ledger.withdraw_reward(&alice).unwrap();
    assert_eq!(receipt.reward, 226);
    assert_eq!(h.balance("alice"), WALLET - 1000 + 226);
    let pos = h.position("alice");
    assert_eq!(pos.start_time, Timestamp::new(T0 + MONTH));
    assert_eq!(pos.principal, 1000);
    assert!(pos.active);
    assert_eq!(h.ledger.pending_reward(&acct("alice")).unwrap(), 0);
    assert_eq!(h.totals().total_reward_liability, -226);

    // Maturity now counts from the new checkpoint.
    assert!(matches!(
        h.ledger.close(&alice),
        Err(LedgerError::TermNotElapsed { .. })
    ));
    h.clock.advance(MONTH);
    let closed = h.ledger.close(&alice).unwrap();
    assert_eq!(closed.reward, 226);
    assert_eq!(h.balance("alice"), WALLET + 452);
    assert_eq!(h.totals().total_reward_liability, -452);
}

// ---------------------------------------------------------------------------
// 4. Custody failures roll back
// ---------------------------------------------------------------------------

#[test]
fn failed_deposit_leaves_no_trace() {
    let h = harness();
    let alice = ctx("alice");
    h.custody.fail_next();
    assert!(matches!(
        h.ledger.open(&alice, 1, 1000),
        Err(LedgerError::TransferFailed(CustodyError::Rejected(_)))
    ));
    assert_eq!(h.position("alice"), StakePosition::default());
    assert_eq!(h.totals(), Totals::default());
    assert_eq!(h.balance("alice"), WALLET);
    assert_eq!(h.event_count(), 0);
}

#[test]
fn insufficient_funds_reverts_open() {
    let h = harness();
    let alice = ctx("alice");
    assert!(matches!(
        h.ledger.open(&alice, 1, WALLET + 1),
        Err(LedgerError::TransferFailed(
            CustodyError::InsufficientBalance { .. }
        ))
    ));
    assert!(!h.position("alice").active);
    assert_eq!(h.totals().total_principal, 0);
}

#[test]
fn failed_payout_keeps_the_position_open() {
    let h = harness();
    let alice = ctx("alice");
    h.ledger.open(&alice, 1, 1000).unwrap();
    h.clock.advance(MONTH);
    let before = h.position("alice");

    h.custody.fail_next();
    assert!(matches!(
        h.ledger.close(&alice),
        Err(LedgerError::TransferFailed(_))
    ));
    assert_eq!(h.position("alice"), before);
    assert_eq!(
        h.totals(),
        Totals {
            total_principal: 1000,
            total_reward_liability: 0,
        }
    );

    h.custody.fail_next();
    assert!(h.ledger.withdraw_reward(&alice).is_err());
    assert_eq!(h.position("alice").start_time, Timestamp::new(T0));

    h.custody.fail_next();
    assert!(h.ledger.close_emergency(&alice).is_err());
    assert!(h.position("alice").active);

    assert_eq!(h.ledger.close(&alice).unwrap().payout, 1226);
}

/// Runs `nested` once, from inside the first custody transfer, then makes
/// that outer transfer fail.
fn fail_after_nested_call(
    custody: &Arc<NullCustody>,
    ledger: &Rc<TestLedger>,
    nested: impl Fn(&TestLedger) + 'static,
) {
    let fired = Cell::new(false);
    let weak_custody = Arc::downgrade(custody);
    let weak_ledger = Rc::downgrade(ledger);
    custody.on_transfer(move |_, _, _| {
        if fired.replace(true) {
            return;
        }
        if let (Some(ledger), Some(custody)) = (weak_ledger.upgrade(), weak_custody.upgrade()) {
            nested(&ledger);
            custody.fail_next();
        }
    });
}

#[test]
fn failed_open_keeps_positions_opened_during_its_transfer() {
    let Harness {
        custody, ledger, ..
    } = harness();
    let ledger = Rc::new(ledger);
    let nested: Rc<RefCell<Option<Result<Receipt, LedgerError>>>> = Rc::new(RefCell::new(None));
    let slot = Rc::clone(&nested);
    fail_after_nested_call(&custody, &ledger, move |l| {
        *slot.borrow_mut() = Some(l.open(&ctx("carol"), 1, 1000));
    });

    assert!(matches!(
        ledger.open(&ctx("alice"), 1, 500),
        Err(LedgerError::TransferFailed(CustodyError::Rejected(_)))
    ));
    assert!(matches!(nested.borrow().as_ref(), Some(Ok(r)) if r.payout == 1000));

    let store = ledger.store();
    assert!(!store.get_position(&acct("alice")).unwrap().active);
    assert_eq!(store.get_position(&acct("carol")).unwrap().principal, 1000);
    assert_eq!(
        store.get_totals().unwrap(),
        Totals {
            total_principal: 1000,
            total_reward_liability: 0,
        }
    );
    assert_eq!(custody.balance_of(&vault()), RESERVE + 1000);
    assert!(ledger.audit(&ctx("root")).unwrap().is_consistent());
}

#[test]
fn failed_close_keeps_rewards_paid_to_others_during_its_transfer() {
    let Harness {
        custody,
        clock,
        ledger,
        ..
    } = harness();
    let ledger = Rc::new(ledger);
    ledger.open(&ctx("alice"), 1, 1000).unwrap();
    ledger.open(&ctx("carol"), 1, 1000).unwrap();
    clock.advance(MONTH);
    fail_after_nested_call(&custody, &ledger, |l| {
        l.withdraw_reward(&ctx("carol")).unwrap();
    });

    assert!(matches!(
        ledger.close(&ctx("alice")),
        Err(LedgerError::TransferFailed(_))
    ));
    let store = ledger.store();
    assert!(store.get_position(&acct("alice")).unwrap().active);
    assert_eq!(
        store.get_totals().unwrap(),
        Totals {
            total_principal: 2000,
            total_reward_liability: -226,
        }
    );
    assert_eq!(custody.balance_of(&acct("carol")), WALLET - 1000 + 226);
}

#[test]
fn failed_rollback_reports_both_errors() {
    let Harness {
        store,
        custody,
        events,
        ledger,
        ..
    } = harness();
    let ledger = Rc::new(ledger);
    let failing_store = Arc::clone(&store);
    fail_after_nested_call(&custody, &ledger, move |_| failing_store.fail_batches(true));

    match ledger.open(&ctx("alice"), 1, 1000) {
        Err(LedgerError::RollbackFailed { transfer, rollback }) => {
            assert!(matches!(transfer, CustodyError::Rejected(_)));
            assert!(matches!(*rollback, LedgerError::Store(_)));
        }
        other => panic!("expected RollbackFailed, got {other:?}"),
    }
    assert_eq!(custody.balance_of(&acct("alice")), WALLET);
    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn rollback_refuses_a_position_changed_during_the_transfer() {
    let Harness {
        store,
        custody,
        ledger,
        ..
    } = harness();
    let ledger = Rc::new(ledger);
    fail_after_nested_call(&custody, &ledger, |l| {
        l.extend_term(&ctx("alice"), 3).unwrap();
    });

    match ledger.open(&ctx("alice"), 1, 1000) {
        Err(LedgerError::RollbackFailed { rollback, .. }) => {
            assert!(matches!(*rollback, LedgerError::RollbackConflict(ref a) if a == &acct("alice")));
        }
        other => panic!("expected RollbackFailed, got {other:?}"),
    }
    assert_eq!(store.get_position(&acct("alice")).unwrap().term_months, 4);
    assert_eq!(store.get_totals().unwrap().total_principal, 1000);
}

// ---------------------------------------------------------------------------
// 5. Authorization and fees
// ---------------------------------------------------------------------------

#[test]
fn participant_tier_is_required() {
    let h = harness();
    match h.ledger.open(&ctx("bob"), 1, 1000) {
        Err(LedgerError::Unauthorized { account, required }) => {
            assert_eq!(account, acct("bob"));
            assert_eq!(required, Tier::Participant);
        }
        other => panic!("expected Unauthorized, got {other:?}"),
    }
    assert_eq!(h.balance("bob"), WALLET);
}

#[test]
fn administrator_tier_is_required_for_admin_ops() {
    let h = harness();
    let alice = ctx("alice");
    for result in [
        h.ledger.set_min_fee(&alice, 5).map(|_| ()),
        h.ledger.totals(&alice).map(|_| ()),
        h.ledger.audit(&alice).map(|_| ()),
        h.ledger
            .grant_role(&alice, &acct("bob"), Tier::Participant),
    ] {
        assert!(matches!(
            result,
            Err(LedgerError::Unauthorized {
                required: Tier::Administrator,
                ..
            })
        ));
    }
    // Administrators are not implicitly participants.
    assert!(matches!(
        h.ledger.open(&ctx("root"), 1, 1),
        Err(LedgerError::Unauthorized { .. })
    ));
}

#[test]
fn fee_gate_rejects_low_offers_after_authorization() {
    let h = harness();
    h.ledger.set_min_fee(&ctx("root"), 10).unwrap();
    assert_eq!(h.ledger.min_fee(), 10);

    let cheap = CallContext::new(acct("alice"), 9);
    assert!(matches!(
        h.ledger.open(&cheap, 1, 1000),
        Err(LedgerError::FeeTooLow {
            offered: 9,
            minimum: 10
        })
    ));
    assert_eq!(h.totals(), Totals::default());

    // Tier check runs first.
    assert!(matches!(
        h.ledger.open(&CallContext::new(acct("bob"), 0), 1, 1000),
        Err(LedgerError::Unauthorized { .. })
    ));

    let fair = CallContext::new(acct("alice"), 10);
    assert!(h.ledger.open(&fair, 1, 1000).is_ok());
}

#[test]
fn initialize_and_revoke_protect_administration() {
    let h = harness();
    assert!(matches!(
        h.ledger.initialize(&acct("mallory")),
        Err(LedgerError::AlreadyInitialized)
    ));

    let root = ctx("root");
    assert!(matches!(
        h.ledger.revoke_role(&root, &acct("root"), Tier::Administrator),
        Err(LedgerError::LastAdministrator)
    ));

    h.ledger
        .grant_role(&root, &acct("carol"), Tier::Administrator)
        .unwrap();
    h.ledger
        .revoke_role(&root, &acct("root"), Tier::Administrator)
        .unwrap();
    assert!(!h.store.get_tiers(&acct("root")).unwrap().administrator);
    assert!(matches!(
        h.ledger.set_min_fee(&root, 1),
        Err(LedgerError::Unauthorized { .. })
    ));

    h.ledger
        .revoke_role(&ctx("carol"), &acct("alice"), Tier::Participant)
        .unwrap();
    assert!(matches!(
        h.ledger.open(&ctx("alice"), 1, 1000),
        Err(LedgerError::Unauthorized { .. })
    ));
}

// ---------------------------------------------------------------------------
// 6. Reentrancy
// ---------------------------------------------------------------------------

#[test]
fn reentrant_close_during_payout_is_refused() {
    let Harness {
        custody,
        clock,
        ledger,
        ..
    } = harness();
    let ledger = Rc::new(ledger);
    ledger.open(&ctx("alice"), 1, 1000).unwrap();
    clock.advance(MONTH);

    let inner: Rc<RefCell<Option<Result<Receipt, LedgerError>>>> = Rc::new(RefCell::new(None));
    let slot = Rc::clone(&inner);
    let weak = Rc::downgrade(&ledger);
    custody.on_transfer(move |_, _, _| {
        if slot.borrow().is_some() {
            return;
        }
        if let Some(ledger) = weak.upgrade() {
            let result = ledger.close(&ctx("alice"));
            *slot.borrow_mut() = Some(result);
        }
    });

    let outer = ledger.close(&ctx("alice")).unwrap();
    assert_eq!(outer.payout, 1226);
    match inner.borrow_mut().take() {
        Some(Err(LedgerError::Reentrant { operation, account })) => {
            assert_eq!(operation, Operation::Close);
            assert_eq!(account, acct("alice"));
        }
        other => panic!("expected Reentrant, got {other:?}"),
    }
    // Paid exactly once.
    assert_eq!(custody.balance_of(&acct("alice")), WALLET + 226);
}

// ---------------------------------------------------------------------------
// 7. Events and solvency
// ---------------------------------------------------------------------------

#[test]
fn every_successful_operation_emits_one_event() {
    let h = harness();
    let alice = ctx("alice");
    h.ledger.open(&alice, 1, 1000).unwrap();
    h.ledger.extend_term(&alice, 1).unwrap();
    h.clock.advance(MONTH);
    h.ledger.withdraw_reward(&alice).unwrap();
    h.clock.advance(2 * MONTH);
    h.ledger.close(&alice).unwrap();
    let _ = h.ledger.close(&alice);

    let events = h.events.lock().unwrap();
    assert_eq!(events.len(), 4);
    assert!(matches!(
        events[0],
        LedgerEvent::PositionOpened {
            principal: 1000,
            term_months: 1,
            ..
        }
    ));
    assert!(matches!(
        events[1],
        LedgerEvent::TermExtended {
            added_months: 1,
            term_months: 2,
            ..
        }
    ));
    assert!(matches!(
        events[2],
        LedgerEvent::RewardSettled { reward: 226, .. }
    ));
    assert!(matches!(
        events[3],
        LedgerEvent::PositionClosed {
            emergency: false,
            penalty: 0,
            ..
        }
    ));
    assert!(events.iter().all(|e| e.account() == &acct("alice")));
}

#[test]
fn principal_counter_matches_open_positions() {
    let h = harness();
    let root = ctx("root");
    h.ledger.open(&ctx("alice"), 1, 1000).unwrap();
    h.ledger.open(&ctx("carol"), 3, 3000).unwrap();
    h.ledger.close_emergency(&ctx("alice")).unwrap();

    let report = h.ledger.audit(&root).unwrap();
    assert!(report.is_consistent());
    assert_eq!(report.recorded_principal, 3000);
    assert_eq!(report.open_positions, 1);
    assert_eq!(h.ledger.totals(&root).unwrap().total_principal, 3000);
    assert_eq!(h.balance("vault"), RESERVE + 3000 + 100);
}
