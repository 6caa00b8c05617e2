//! The ledger controller.
//!
//! Orchestrates the five position operations over an injected store, custody
//! gateway, clock and authorizer. Each operation follows the same shape:
//!
//! 1. tier check, fee gate, reentrancy guard
//! 2. preconditions, in the order callers see them fail
//! 3. stage position + totals in a [`Changeset`] and commit it
//! 4. custody transfer; on failure take the commit back out and abort
//! 5. emit a [`LedgerEvent`]

use serde::Serialize;
use stake_rewards::RewardEngine;
use stake_store::{LedgerStore, Totals};
use stake_types::{AccountId, Clock, LedgerParams, StakePosition, Term, Tier, Timestamp};

use crate::access::Authorizer;
use crate::changeset::Changeset;
use crate::custody::CustodyGateway;
use crate::event::{EventBus, LedgerEvent};
use crate::fee::FeeGate;
use crate::guard::{GuardToken, Operation, ReentrancyGuard};
use crate::LedgerError;

/// Who is calling and what transaction price they offer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallContext {
    pub caller: AccountId,
    pub offered_fee: u64,
}

impl CallContext {
    pub fn new(caller: AccountId, offered_fee: u64) -> Self {
        Self {
            caller,
            offered_fee,
        }
    }
}

/// Outcome of a successful position operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub operation: Operation,
    pub account: AccountId,
    /// Principal of the position the operation acted on.
    pub principal: u128,
    /// Reward settled by this operation.
    pub reward: u128,
    /// Principal withheld by an emergency close.
    pub penalty: u128,
    /// Units moved by the custody transfer (in for open, out otherwise).
    pub payout: u128,
    /// Term in months after the operation.
    pub term_months: u32,
    pub at: Timestamp,
}

/// Cross-check of the principal counter against the stored positions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SolvencyReport {
    pub recorded_principal: u128,
    pub computed_principal: u128,
    pub open_positions: u64,
    pub total_reward_liability: i128,
}

impl SolvencyReport {
    pub fn is_consistent(&self) -> bool {
        self.recorded_principal == self.computed_principal
    }
}

/// The stake ledger.
pub struct StakeLedger<S, G, K, A> {
    store: S,
    custody: G,
    clock: K,
    access: A,
    vault: AccountId,
    engine: RewardEngine,
    fees: FeeGate,
    guard: ReentrancyGuard,
    events: EventBus,
}

impl<S, G, K, A> StakeLedger<S, G, K, A>
where
    S: LedgerStore,
    G: CustodyGateway,
    K: Clock,
    A: Authorizer,
{
    pub fn new(
        store: S,
        custody: G,
        clock: K,
        access: A,
        vault: AccountId,
        params: LedgerParams,
    ) -> Self {
        Self {
            store,
            custody,
            clock,
            access,
            vault,
            engine: RewardEngine::new(params),
            fees: FeeGate::default(),
            guard: ReentrancyGuard::new(),
            events: EventBus::new(),
        }
    }

    /// Set the initial minimum transaction price.
    pub fn with_min_fee(self, min_fee: u64) -> Self {
        self.fees.set_minimum(min_fee);
        self
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn vault(&self) -> &AccountId {
        &self.vault
    }

    pub fn params(&self) -> &LedgerParams {
        self.engine.params()
    }

    pub fn min_fee(&self) -> u64 {
        self.fees.minimum()
    }

    // ── Bootstrap ───────────────────────────────────────────────────────

    /// Grant the first administrator. Fails once any administrator exists.
    pub fn initialize(&self, admin: &AccountId) -> Result<(), LedgerError> {
        if self.store.administrator_count()? > 0 {
            return Err(LedgerError::AlreadyInitialized);
        }
        self.store.grant_tier(admin, Tier::Administrator)?;
        tracing::info!(admin = %admin, "ledger initialized");
        Ok(())
    }

    // ── Position operations ─────────────────────────────────────────────

    /// Open a position: pull `amount` into the vault for `term_months`.
    pub fn open(
        &self,
        ctx: &CallContext,
        term_months: u32,
        amount: u128,
    ) -> Result<Receipt, LedgerError> {
        let _token = self.begin(ctx, Operation::Open)?;
        let caller = &ctx.caller;

        let term = Term::from_months(term_months)
            .map_err(|_| LedgerError::InvalidTerm(term_months))?;
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let existing = self.store.get_position(caller)?;
        if existing.is_open() {
            return Err(LedgerError::PositionAlreadyOpen(caller.clone()));
        }

        let now = self.clock.now();
        let position = StakePosition::open(amount, term, now);
        // Zero elapsed time, recognized for bookkeeping only.
        let reward = self.engine.accrued_for(&position, now)?;

        let mut changes = Changeset::new(caller, existing, self.store.get_totals()?);
        changes.set_position(position.clone());
        changes.add_principal(amount)?;
        changes.recognize_reward(reward)?;
        self.commit_and_transfer(changes, caller, &self.vault, amount)?;

        tracing::info!(account = %caller, principal = amount, term_months, "position opened");
        self.events.emit(&LedgerEvent::PositionOpened {
            account: caller.clone(),
            principal: amount,
            term_months,
            at: now,
        });
        Ok(Receipt {
            operation: Operation::Open,
            account: caller.clone(),
            principal: amount,
            reward: 0,
            penalty: 0,
            payout: amount,
            term_months: position.term_months,
            at: now,
        })
    }

    /// Close a matured position, paying out principal plus accrued reward.
    pub fn close(&self, ctx: &CallContext) -> Result<Receipt, LedgerError> {
        let _token = self.begin(ctx, Operation::Close)?;
        let caller = &ctx.caller;

        let position = self.open_position(caller)?;
        let now = self.clock.now();
        let matures_at = position.matures_at(self.params().seconds_per_month);
        if now < matures_at {
            return Err(LedgerError::TermNotElapsed { matures_at, now });
        }

        let reward = self.engine.accrued_for(&position, now)?;
        let payout = position
            .principal
            .checked_add(reward)
            .ok_or(LedgerError::Overflow)?;

        let mut changes = Changeset::new(caller, position.clone(), self.store.get_totals()?);
        changes.set_position(position.cleared());
        changes.sub_principal(position.principal)?;
        changes.release_reward(reward)?;
        self.commit_and_transfer(changes, &self.vault, caller, payout)?;

        tracing::info!(
            account = %caller,
            principal = position.principal,
            reward,
            "position closed"
        );
        self.events.emit(&LedgerEvent::PositionClosed {
            account: caller.clone(),
            principal: position.principal,
            reward,
            penalty: 0,
            emergency: false,
            at: now,
        });
        Ok(Receipt {
            operation: Operation::Close,
            account: caller.clone(),
            principal: position.principal,
            reward,
            penalty: 0,
            payout,
            term_months: position.term_months,
            at: now,
        })
    }

    /// Close at any time, forfeiting reward and a fixed share of principal.
    ///
    /// The liability counter is not touched.
    pub fn close_emergency(&self, ctx: &CallContext) -> Result<Receipt, LedgerError> {
        let _token = self.begin(ctx, Operation::EmergencyClose)?;
        let caller = &ctx.caller;

        let position = self.open_position(caller)?;
        let now = self.clock.now();
        let penalty = self.params().emergency_penalty(position.principal);
        let payout = position
            .principal
            .checked_sub(penalty)
            .ok_or(LedgerError::Overflow)?;

        let mut changes = Changeset::new(caller, position.clone(), self.store.get_totals()?);
        changes.set_position(position.cleared());
        changes.sub_principal(position.principal)?;
        self.commit_and_transfer(changes, &self.vault, caller, payout)?;

        tracing::info!(
            account = %caller,
            principal = position.principal,
            penalty,
            "position closed early"
        );
        self.events.emit(&LedgerEvent::PositionClosed {
            account: caller.clone(),
            principal: position.principal,
            reward: 0,
            penalty,
            emergency: true,
            at: now,
        });
        Ok(Receipt {
            operation: Operation::EmergencyClose,
            account: caller.clone(),
            principal: position.principal,
            reward: 0,
            penalty,
            payout,
            term_months: position.term_months,
            at: now,
        })
    }

    /// Lengthen an open position's term. The new total is not re-validated.
    pub fn extend_term(&self, ctx: &CallContext, add_months: u32) -> Result<Receipt, LedgerError> {
        let _token = self.begin(ctx, Operation::ExtendTerm)?;
        let caller = &ctx.caller;

        let added = Term::from_months(add_months)
            .map_err(|_| LedgerError::InvalidTerm(add_months))?;
        let position = self.open_position(caller)?;
        let now = self.clock.now();

        let extended = StakePosition {
            term_months: position
                .term_months
                .checked_add(added.months())
                .ok_or(LedgerError::Overflow)?,
            ..position.clone()
        };
        let mut changes = Changeset::new(caller, position.clone(), self.store.get_totals()?);
        changes.set_position(extended.clone());
        changes.commit(&self.store)?.settle();

        tracing::info!(
            account = %caller,
            added_months = add_months,
            term_months = extended.term_months,
            "term extended"
        );
        self.events.emit(&LedgerEvent::TermExtended {
            account: caller.clone(),
            added_months: add_months,
            term_months: extended.term_months,
            at: now,
        });
        Ok(Receipt {
            operation: Operation::ExtendTerm,
            account: caller.clone(),
            principal: position.principal,
            reward: 0,
            penalty: 0,
            payout: 0,
            term_months: extended.term_months,
            at: now,
        })
    }

    /// Pay out accrued reward only and restart accrual from now.
    pub fn withdraw_reward(&self, ctx: &CallContext) -> Result<Receipt, LedgerError> {
        let _token = self.begin(ctx, Operation::WithdrawReward)?;
        let caller = &ctx.caller;

        let position = self.open_position(caller)?;
        let now = self.clock.now();
        let reward = self.engine.accrued_for(&position, now)?;
        if reward == 0 {
            return Err(LedgerError::NoRewardDue);
        }

        let checkpointed = StakePosition {
            start_time: now,
            ..position.clone()
        };
        let mut changes = Changeset::new(caller, position.clone(), self.store.get_totals()?);
        changes.set_position(checkpointed);
        changes.release_reward(reward)?;
        self.commit_and_transfer(changes, &self.vault, caller, reward)?;

        tracing::info!(account = %caller, reward, "reward settled");
        self.events.emit(&LedgerEvent::RewardSettled {
            account: caller.clone(),
            reward,
            at: now,
        });
        Ok(Receipt {
            operation: Operation::WithdrawReward,
            account: caller.clone(),
            principal: position.principal,
            reward,
            penalty: 0,
            payout: reward,
            term_months: position.term_months,
            at: now,
        })
    }

    // ── Administration ──────────────────────────────────────────────────

    pub fn grant_role(
        &self,
        ctx: &CallContext,
        account: &AccountId,
        tier: Tier,
    ) -> Result<(), LedgerError> {
        self.access.authorize(&ctx.caller, Tier::Administrator)?;
        self.store.grant_tier(account, tier)?;
        tracing::info!(by = %ctx.caller, account = %account, %tier, "tier granted");
        Ok(())
    }

    pub fn revoke_role(
        &self,
        ctx: &CallContext,
        account: &AccountId,
        tier: Tier,
    ) -> Result<(), LedgerError> {
        self.access.authorize(&ctx.caller, Tier::Administrator)?;
        if tier == Tier::Administrator
            && self.store.get_tiers(account)?.administrator
            && self.store.administrator_count()? <= 1
        {
            return Err(LedgerError::LastAdministrator);
        }
        self.store.revoke_tier(account, tier)?;
        tracing::info!(by = %ctx.caller, account = %account, %tier, "tier revoked");
        Ok(())
    }

    pub fn set_min_fee(&self, ctx: &CallContext, min_fee: u64) -> Result<(), LedgerError> {
        self.access.authorize(&ctx.caller, Tier::Administrator)?;
        self.fees.set_minimum(min_fee);
        tracing::info!(by = %ctx.caller, min_fee, "minimum fee updated");
        Ok(())
    }

    pub fn totals(&self, ctx: &CallContext) -> Result<Totals, LedgerError> {
        self.access.authorize(&ctx.caller, Tier::Administrator)?;
        Ok(self.store.get_totals()?)
    }

    /// Recompute total principal from the stored positions.
    pub fn audit(&self, ctx: &CallContext) -> Result<SolvencyReport, LedgerError> {
        self.access.authorize(&ctx.caller, Tier::Administrator)?;
        let totals = self.store.get_totals()?;
        let mut computed_principal: u128 = 0;
        let mut open_positions = 0u64;
        for (_, position) in self.store.iter_positions()? {
            if position.is_open() {
                computed_principal = computed_principal
                    .checked_add(position.principal)
                    .ok_or(LedgerError::Overflow)?;
                open_positions += 1;
            }
        }
        let report = SolvencyReport {
            recorded_principal: totals.total_principal,
            computed_principal,
            open_positions,
            total_reward_liability: totals.total_reward_liability,
        };
        if !report.is_consistent() {
            tracing::warn!(
                recorded = report.recorded_principal,
                computed = report.computed_principal,
                "principal counter disagrees with positions"
            );
        }
        Ok(report)
    }

    // ── Views ───────────────────────────────────────────────────────────

    pub fn position(&self, account: &AccountId) -> Result<StakePosition, LedgerError> {
        Ok(self.store.get_position(account)?)
    }

    /// Reward the account would settle if it withdrew now.
    pub fn pending_reward(&self, account: &AccountId) -> Result<u128, LedgerError> {
        let position = self.open_position(account)?;
        Ok(self.engine.accrued_for(&position, self.clock.now())?)
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn begin(&self, ctx: &CallContext, operation: Operation) -> Result<GuardToken<'_>, LedgerError> {
        self.access.authorize(&ctx.caller, Tier::Participant)?;
        self.fees.check(ctx.offered_fee)?;
        self.guard.enter(operation, &ctx.caller)
    }

    fn open_position(&self, account: &AccountId) -> Result<StakePosition, LedgerError> {
        let position = self.store.get_position(account)?;
        if !position.is_open() {
            tracing::debug!(account = %account, "no open position");
            return Err(LedgerError::NoActivePosition(account.clone()));
        }
        Ok(position)
    }

    fn commit_and_transfer(
        &self,
        changes: Changeset,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let committed = changes.commit(&self.store)?;
        match self.custody.transfer(from, to, amount) {
            Ok(()) => {
                committed.settle();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    from = %from,
                    to = %to,
                    amount,
                    error = %e,
                    "custody transfer failed, reverting"
                );
                match committed.revert(&self.store) {
                    Ok(()) => Err(LedgerError::TransferFailed(e)),
                    Err(rollback) => {
                        tracing::error!(
                            to = %to,
                            amount,
                            transfer_error = %e,
                            rollback_error = %rollback,
                            "rollback after failed transfer did not apply"
                        );
                        Err(LedgerError::RollbackFailed {
                            transfer: e,
                            rollback: Box::new(rollback),
                        })
                    }
                }
            }
        }
    }
}
