use proptest::prelude::*;
use std::sync::Arc;

use stake_ledger::{CallContext, Operation, RoleAuthorizer, StakeLedger};
use stake_nullables::{NullClock, NullCustody, NullStore};
use stake_store::{PositionStore, TotalsStore};
use stake_types::{AccountId, LedgerParams, Tier};

const ACCOUNTS: [&str; 3] = ["alice", "bob", "carol"];
const WALLET: u128 = 1_000_000;
const RESERVE: u128 = 1_000_000_000_000;

#[derive(Clone, Debug)]
struct Step {
    account: usize,
    op: u8,
    months: u32,
    amount: u128,
    advance: u64,
    custody_fails: bool,
}

fn step() -> impl Strategy<Value = Step> {
    (
        0..ACCOUNTS.len(),
        0u8..5,
        prop::sample::select(vec![0u32, 1, 2, 3, 6, 12]),
        0u128..50_000,
        0u64..45 * 86_400,
        prop::bool::weighted(0.15),
    )
        .prop_map(|(account, op, months, amount, advance, custody_fails)| Step {
            account,
            op,
            months,
            amount,
            advance,
            custody_fails,
        })
}

proptest! {
    /// Under any interleaving of operations, successful or not:
    /// - total principal equals the sum over open positions
    /// - custody balances are conserved
    /// - liability equals minus the reward paid out
    /// - a failed operation changes neither the caller's record nor the totals
    #[test]
    fn ledger_invariants_hold(steps in prop::collection::vec(step(), 1..60)) {
        let store = Arc::new(NullStore::new());
        let custody = Arc::new(NullCustody::new());
        let clock = Arc::new(NullClock::new(1_000_000));
        let vault = AccountId::new("vault");
        let ledger = StakeLedger::new(
            Arc::clone(&store),
            Arc::clone(&custody),
            Arc::clone(&clock),
            RoleAuthorizer::new(Arc::clone(&store)),
            vault.clone(),
            LedgerParams::default(),
        );
        let root = CallContext::new(AccountId::new("root"), 0);
        ledger.initialize(&root.caller).unwrap();
        for name in ACCOUNTS {
            ledger.grant_role(&root, &AccountId::new(name), Tier::Participant).unwrap();
            custody.deposit(&AccountId::new(name), WALLET);
        }
        custody.deposit(&vault, RESERVE);
        let supply = RESERVE + WALLET * ACCOUNTS.len() as u128;
        let mut rewards_paid: u128 = 0;

        for s in steps {
            clock.advance(s.advance);
            custody.set_failing(s.custody_fails);
            let ctx = CallContext::new(AccountId::new(ACCOUNTS[s.account]), 0);
            let before_position = store.get_position(&ctx.caller).unwrap();
            let before_totals = store.get_totals().unwrap();

            let result = match s.op {
                0 => ledger.open(&ctx, s.months, s.amount),
                1 => ledger.close(&ctx),
                2 => ledger.close_emergency(&ctx),
                3 => ledger.extend_term(&ctx, s.months),
                _ => ledger.withdraw_reward(&ctx),
            };

            match result {
                Ok(receipt) => {
                    if matches!(receipt.operation, Operation::Close | Operation::WithdrawReward) {
                        rewards_paid += receipt.reward;
                    }
                }
                Err(_) => {
                    prop_assert_eq!(store.get_position(&ctx.caller).unwrap(), before_position);
                    prop_assert_eq!(store.get_totals().unwrap(), before_totals);
                }
            }

            let totals = store.get_totals().unwrap();
            let open_sum: u128 = store
                .iter_positions()
                .unwrap()
                .iter()
                .filter(|(_, p)| p.active)
                .map(|(_, p)| p.principal)
                .sum();
            prop_assert_eq!(totals.total_principal, open_sum);
            prop_assert_eq!(totals.total_reward_liability, -(rewards_paid as i128));

            let held: u128 = ACCOUNTS
                .iter()
                .map(|n| custody.balance_of(&AccountId::new(*n)))
                .sum::<u128>()
                + custody.balance_of(&vault);
            prop_assert_eq!(held, supply);
        }
    }

    /// A closed position never pays less than its principal.
    #[test]
    fn matured_close_returns_at_least_principal(
        amount in 1u128..10_000_000,
        months in prop::sample::select(vec![1u32, 3, 6, 12]),
        extra in 0u64..365 * 86_400,
    ) {
        let store = Arc::new(NullStore::new());
        let custody = Arc::new(NullCustody::new());
        let clock = Arc::new(NullClock::new(0));
        let ledger = StakeLedger::new(
            Arc::clone(&store),
            Arc::clone(&custody),
            Arc::clone(&clock),
            |_: &AccountId, _: stake_types::Tier| true,
            AccountId::new("vault"),
            LedgerParams::default(),
        );
        let alice = AccountId::new("alice");
        custody.deposit(&alice, amount);
        custody.deposit(&AccountId::new("vault"), RESERVE);
        let ctx = CallContext::new(alice.clone(), 0);

        ledger.open(&ctx, months, amount).unwrap();
        clock.advance(u64::from(months) * 30 * 86_400 + extra);
        let receipt = ledger.close(&ctx).unwrap();
        prop_assert!(receipt.payout >= amount);
        prop_assert_eq!(receipt.payout, amount + receipt.reward);
        prop_assert_eq!(custody.balance_of(&alice), receipt.payout);
    }
}
