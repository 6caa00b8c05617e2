#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

use stake_ledger::{CallContext, StakeLedger};
use stake_nullables::{NullClock, NullCustody, NullStore};
use stake_store::{PositionStore, TotalsStore};
use stake_types::{AccountId, LedgerParams, Tier};

#[derive(Debug, Arbitrary)]
enum Op {
    Open { months: u32, amount: u32 },
    Close,
    EmergencyClose,
    Extend { months: u32 },
    Withdraw,
}

#[derive(Debug, Arbitrary)]
struct Step {
    account: bool,
    advance: u32,
    custody_fails: bool,
    op: Op,
}

// Arbitrary operation sequences must keep the principal counter equal to
// the sum of open positions and never create or destroy custody units.
fuzz_target!(|steps: Vec<Step>| {
    let store = Arc::new(NullStore::new());
    let custody = NullCustody::new();
    let clock = NullClock::new(0);
    let ledger = StakeLedger::new(
        Arc::clone(&store),
        &custody,
        &clock,
        |_: &AccountId, tier: Tier| tier == Tier::Participant,
        AccountId::new("vault"),
        LedgerParams::default(),
    );
    let accounts = [AccountId::new("a"), AccountId::new("b")];
    for account in &accounts {
        custody.deposit(account, u128::from(u32::MAX) * 4);
    }
    custody.deposit(&AccountId::new("vault"), u128::MAX / 4);
    let supply = u128::from(u32::MAX) * 8 + u128::MAX / 4;

    for step in steps.into_iter().take(64) {
        clock.advance(u64::from(step.advance));
        custody.set_failing(step.custody_fails);
        let account = &accounts[usize::from(step.account)];
        let ctx = CallContext::new(account.clone(), 0);
        let _ = match step.op {
            Op::Open { months, amount } => ledger.open(&ctx, months, u128::from(amount)),
            Op::Close => ledger.close(&ctx),
            Op::EmergencyClose => ledger.close_emergency(&ctx),
            Op::Extend { months } => ledger.extend_term(&ctx, months),
            Op::Withdraw => ledger.withdraw_reward(&ctx),
        };

        let open_sum: u128 = store
            .iter_positions()
            .unwrap()
            .iter()
            .filter(|(_, p)| p.active)
            .map(|(_, p)| p.principal)
            .sum();
        assert_eq!(store.get_totals().unwrap().total_principal, open_sum);

        let held = accounts
            .iter()
            .map(|a| custody.balance_of(a))
            .sum::<u128>()
            + custody.balance_of(&AccountId::new("vault"));
        assert_eq!(held, supply);
    }
});
