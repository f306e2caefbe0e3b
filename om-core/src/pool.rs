//! Pool Manager
//!
//! Escrow layer letting multiple parties jointly fund a single answer
//! submission. Contributions accumulate in the pool's own escrow account;
//! the contribution that reaches the target executes the registry submission
//! in the same transaction, so there is no observable state where the pool
//! holds enough and has not acted. Expiry is evaluated lazily on withdraw
//! and cancel, never by a background sweep.
//!
//! A pool-executed submission records the pool's protocol account as the
//! question owner; later fee shares accrue to the pool's escrow and each
//! contributor claims a pro-rata cut.

use crate::error::{MarketError, MarketResult};
use crate::registry::OpinionRegistry;
use crate::types::{
    AccountId, EntryGuard, MarketEvent, OpinionId, Pool, PoolId, PoolStatus, TxContext,
};
use crate::vault::{AssetVault, TransferLeg, TransferPlan};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::collections::HashMap;

/// Pool store and crowdfunded-submission orchestrator
pub struct PoolManager {
    pools: BTreeMap<PoolId, Pool>,
    next_id: u64,
    events: Vec<MarketEvent>,
    guard: EntryGuard,
}

impl PoolManager {
    pub fn new() -> Self {
        Self {
            pools: BTreeMap::new(),
            next_id: 0,
            events: Vec::new(),
            guard: EntryGuard::new("pool_manager"),
        }
    }

    // ============================================================
    // Read-only queries
    // ============================================================

    pub fn get_pool(&self, pool_id: PoolId) -> MarketResult<&Pool> {
        self.pools
            .get(&pool_id)
            .ok_or_else(|| MarketError::not_found("Pool", pool_id))
    }

    /// Count of pools created; also the id the next creation receives
    pub fn next_pool_id(&self) -> u64 {
        self.next_id
    }

    /// Take all events committed since the last drain
    pub fn drain_events(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.events)
    }

    // ============================================================
    // Creation
    // ============================================================

    /// Open a pool targeting `opinion_id` with the intended answer.
    ///
    /// The target price snapshots the opinion's current required price; it
    /// is refreshed on every contribution so execution always pays the
    /// price required at execution time.
    pub fn create_pool(
        &mut self,
        ctx: &TxContext,
        registry: &OpinionRegistry,
        opinion_id: OpinionId,
        answer: &str,
        description: &str,
        deadline: DateTime<Utc>,
    ) -> MarketResult<PoolId> {
        self.guard.enter()?;
        let result = self.create_pool_inner(ctx, registry, opinion_id, answer, description, deadline);
        self.guard.exit();
        result
    }

    fn create_pool_inner(
        &mut self,
        ctx: &TxContext,
        registry: &OpinionRegistry,
        opinion_id: OpinionId,
        answer: &str,
        description: &str,
        deadline: DateTime<Utc>,
    ) -> MarketResult<PoolId> {
        registry.validate_submission_text(answer, description)?;
        let quote = registry.quote_submission(opinion_id, &ctx.now)?;
        if deadline <= ctx.now {
            return Err(MarketError::invalid_input("deadline must be in the future"));
        }

        let pool_id = PoolId::new(self.next_id);
        let pool = Pool {
            pool_id,
            target_opinion_id: opinion_id,
            target_answer: answer.to_string(),
            target_answer_description: description.to_string(),
            target_price: quote.required_price,
            total_amount: 0,
            contributions: HashMap::new(),
            status: PoolStatus::Open,
            deadline,
            created_at: ctx.now,
            earnings_claimed: HashMap::new(),
            total_claimed: 0,
        };
        self.pools.insert(pool_id, pool);
        self.next_id += 1;
        self.events.push(MarketEvent::PoolCreated {
            pool_id,
            target_opinion_id: opinion_id,
            target_price: quote.required_price,
            deadline,
            timestamp: ctx.now,
        });

        tracing::info!(
            pool_id = pool_id.value(),
            opinion_id = opinion_id.value(),
            caller = %ctx.caller,
            target_price = quote.required_price,
            operation = "create_pool",
            "pool created"
        );

        Ok(pool_id)
    }

    // ============================================================
    // Contribution and execution
    // ============================================================

    /// Escrow a contribution toward the pool's target.
    ///
    /// Only the amount still missing is accepted, so the marginal
    /// contributor's surplus is never pulled. The contribution that reaches
    /// the target triggers the registry submission in this same call.
    /// Returns the amount actually escrowed.
    pub fn add_contribution(
        &mut self,
        ctx: &TxContext,
        registry: &mut OpinionRegistry,
        vault: &mut AssetVault,
        pool_id: PoolId,
        amount: u64,
    ) -> MarketResult<u64> {
        self.guard.enter()?;
        let result = self.add_contribution_inner(ctx, registry, vault, pool_id, amount);
        self.guard.exit();
        result
    }

    fn add_contribution_inner(
        &mut self,
        ctx: &TxContext,
        registry: &mut OpinionRegistry,
        vault: &mut AssetVault,
        pool_id: PoolId,
        amount: u64,
    ) -> MarketResult<u64> {
        // Phase 1: validate against current state, no mutation
        if amount == 0 {
            return Err(MarketError::invalid_input("contribution must be positive"));
        }
        let (opinion_id, total_before) = {
            let pool = self.get_pool(pool_id)?;
            require_open(pool)?;
            if pool.is_expired(&ctx.now) {
                return Err(MarketError::PoolClosed {
                    pool_id: pool_id.value(),
                    reason: "deadline passed".to_string(),
                });
            }
            (pool.target_opinion_id, pool.total_amount)
        };

        // The price required at execution time; the quote also rules out
        // every price-side failure of a submission in this transaction
        let quote = registry.quote_submission(opinion_id, &ctx.now)?;
        let target = quote.required_price;
        let remaining = target - total_before;
        let accepted = amount.min(remaining);
        let crosses = accepted == remaining;

        let escrow = AccountId::pool(pool_id);
        let mut plan = TransferPlan::new();
        plan.push(TransferLeg::pull(ctx.caller.clone(), escrow.clone(), accepted));
        vault.check_plan(&plan)?;

        // Phase 2: commit the contribution
        {
            let pool = self
                .pools
                .get_mut(&pool_id)
                .ok_or_else(|| MarketError::not_found("Pool", pool_id))?;
            pool.target_price = target;
            let recorded = pool.contributions.entry(ctx.caller.clone()).or_insert(0);
            *recorded = recorded.checked_add(accepted).ok_or_else(|| {
                MarketError::ArithmeticOverflow {
                    context: "contribution total".to_string(),
                }
            })?;
            pool.total_amount += accepted;
            self.events.push(MarketEvent::ContributionAdded {
                pool_id,
                contributor: ctx.caller.clone(),
                amount: accepted,
                total_amount: pool.total_amount,
                timestamp: ctx.now,
            });
        }
        vault.apply_plan(&plan)?;

        tracing::info!(
            pool_id = pool_id.value(),
            caller = %ctx.caller,
            amount = accepted,
            operation = "add_contribution",
            "contribution escrowed"
        );

        // Phase 3: threshold crossed, execute in this same transaction. The
        // quote above cleared every price-side failure mode and the escrow
        // holds exactly the target, so the submission cannot fail here.
        if crosses {
            let (answer, description) = {
                let pool = self.get_pool(pool_id)?;
                (pool.target_answer.clone(), pool.target_answer_description.clone())
            };
            let pool_ctx = ctx.on_behalf_of(escrow);
            registry.submit_answer(&pool_ctx, vault, opinion_id, &answer, &description, target)?;

            let pool = self
                .pools
                .get_mut(&pool_id)
                .ok_or_else(|| MarketError::not_found("Pool", pool_id))?;
            pool.status = PoolStatus::Executed;
            self.events.push(MarketEvent::PoolExecuted {
                pool_id,
                target_opinion_id: opinion_id,
                price: target,
                timestamp: ctx.now,
            });

            tracing::info!(
                pool_id = pool_id.value(),
                opinion_id = opinion_id.value(),
                amount = target,
                operation = "add_contribution",
                "pool executed"
            );
        }

        Ok(accepted)
    }

    // ============================================================
    // Refunds and cancellation
    // ============================================================

    /// Pull-based refund of the caller's own contribution.
    ///
    /// Permitted once the pool is cancelled, or still open past its
    /// deadline without execution. Each contributor withdraws
    /// independently, so one failing refund never blocks another's.
    pub fn withdraw(
        &mut self,
        ctx: &TxContext,
        vault: &mut AssetVault,
        pool_id: PoolId,
    ) -> MarketResult<u64> {
        self.guard.enter()?;
        let result = self.withdraw_inner(ctx, vault, pool_id);
        self.guard.exit();
        result
    }

    fn withdraw_inner(
        &mut self,
        ctx: &TxContext,
        vault: &mut AssetVault,
        pool_id: PoolId,
    ) -> MarketResult<u64> {
        let amount = {
            let pool = self.get_pool(pool_id)?;
            match pool.status {
                PoolStatus::Cancelled => {}
                PoolStatus::Open if pool.is_expired(&ctx.now) => {}
                PoolStatus::Open => {
                    return Err(MarketError::PoolClosed {
                        pool_id: pool_id.value(),
                        reason: "pool is still open".to_string(),
                    });
                }
                PoolStatus::Executed => {
                    return Err(MarketError::PoolClosed {
                        pool_id: pool_id.value(),
                        reason: "pool executed".to_string(),
                    });
                }
            }
            *pool
                .contributions
                .get(&ctx.caller)
                .ok_or_else(|| MarketError::not_found("Contribution", &ctx.caller))?
        };

        let escrow = AccountId::pool(pool_id);
        let mut plan = TransferPlan::new();
        plan.push(TransferLeg::direct(escrow, ctx.caller.clone(), amount));
        vault.check_plan(&plan)?;

        let pool = self
            .pools
            .get_mut(&pool_id)
            .ok_or_else(|| MarketError::not_found("Pool", pool_id))?;
        pool.contributions.remove(&ctx.caller);
        pool.total_amount -= amount;
        self.events.push(MarketEvent::ContributionWithdrawn {
            pool_id,
            contributor: ctx.caller.clone(),
            amount,
            timestamp: ctx.now,
        });
        vault.apply_plan(&plan)?;

        tracing::info!(
            pool_id = pool_id.value(),
            caller = %ctx.caller,
            amount,
            operation = "withdraw",
            "contribution refunded"
        );

        Ok(amount)
    }

    /// Close an expired, unexecuted pool. Irreversible, permissionless;
    /// only valid after the deadline.
    pub fn cancel(&mut self, ctx: &TxContext, pool_id: PoolId) -> MarketResult<()> {
        self.guard.enter()?;
        let result = self.cancel_inner(ctx, pool_id);
        self.guard.exit();
        result
    }

    fn cancel_inner(&mut self, ctx: &TxContext, pool_id: PoolId) -> MarketResult<()> {
        {
            let pool = self.get_pool(pool_id)?;
            require_open(pool)?;
            if !pool.is_expired(&ctx.now) {
                return Err(MarketError::invalid_input("deadline not reached"));
            }
        }

        let pool = self
            .pools
            .get_mut(&pool_id)
            .ok_or_else(|| MarketError::not_found("Pool", pool_id))?;
        pool.status = PoolStatus::Cancelled;
        self.events.push(MarketEvent::PoolCancelled {
            pool_id,
            timestamp: ctx.now,
        });

        tracing::info!(
            pool_id = pool_id.value(),
            caller = %ctx.caller,
            operation = "cancel",
            "pool cancelled"
        );
        Ok(())
    }

    // ============================================================
    // Earnings
    // ============================================================

    /// Claim the caller's pro-rata share of fee income accrued to an
    /// executed pool's escrow.
    ///
    /// Entitlement is cumulative: `contribution / total * lifetime earnings`
    /// minus what the caller already took, so repeated claims never
    /// over-pay and late claimers lose nothing. Rounding dust stays in
    /// escrow.
    pub fn claim_earnings(
        &mut self,
        ctx: &TxContext,
        vault: &mut AssetVault,
        pool_id: PoolId,
    ) -> MarketResult<u64> {
        self.guard.enter()?;
        let result = self.claim_earnings_inner(ctx, vault, pool_id);
        self.guard.exit();
        result
    }

    fn claim_earnings_inner(
        &mut self,
        ctx: &TxContext,
        vault: &mut AssetVault,
        pool_id: PoolId,
    ) -> MarketResult<u64> {
        let escrow = AccountId::pool(pool_id);
        let claimable = {
            let pool = self.get_pool(pool_id)?;
            if pool.status != PoolStatus::Executed {
                return Err(MarketError::PoolClosed {
                    pool_id: pool_id.value(),
                    reason: "no earnings before execution".to_string(),
                });
            }
            let contribution = *pool
                .contributions
                .get(&ctx.caller)
                .ok_or_else(|| MarketError::not_found("Contribution", &ctx.caller))?;

            let lifetime = vault.balance_of(&escrow) as u128 + pool.total_claimed as u128;
            let entitlement = lifetime * contribution as u128 / pool.total_amount as u128;
            let already = pool
                .earnings_claimed
                .get(&ctx.caller)
                .copied()
                .unwrap_or(0);
            let claimable = entitlement.saturating_sub(already as u128);
            u64::try_from(claimable).map_err(|_| MarketError::ArithmeticOverflow {
                context: "earnings claim".to_string(),
            })?
        };
        if claimable == 0 {
            return Err(MarketError::invalid_input("no earnings to claim"));
        }

        let mut plan = TransferPlan::new();
        plan.push(TransferLeg::direct(escrow, ctx.caller.clone(), claimable));
        vault.check_plan(&plan)?;

        let pool = self
            .pools
            .get_mut(&pool_id)
            .ok_or_else(|| MarketError::not_found("Pool", pool_id))?;
        let claimed = pool.earnings_claimed.entry(ctx.caller.clone()).or_insert(0);
        *claimed = claimed
            .checked_add(claimable)
            .ok_or_else(|| MarketError::ArithmeticOverflow {
                context: "earnings claimed total".to_string(),
            })?;
        pool.total_claimed += claimable;
        self.events.push(MarketEvent::EarningsClaimed {
            pool_id,
            contributor: ctx.caller.clone(),
            amount: claimable,
            timestamp: ctx.now,
        });
        vault.apply_plan(&plan)?;

        tracing::info!(
            pool_id = pool_id.value(),
            caller = %ctx.caller,
            amount = claimable,
            operation = "claim_earnings",
            "earnings claimed"
        );

        Ok(claimable)
    }
}

impl Default for PoolManager {
    fn default() -> Self {
        Self::new()
    }
}

fn require_open(pool: &Pool) -> MarketResult<()> {
    if pool.status == PoolStatus::Open {
        return Ok(());
    }
    Err(MarketError::PoolClosed {
        pool_id: pool.pool_id.value(),
        reason: format!("pool is {:?}", pool.status),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarketConfig;
    use chrono::{Duration, Utc};

    struct Market {
        registry: OpinionRegistry,
        pools: PoolManager,
        vault: AssetVault,
        base: DateTime<Utc>,
    }

    // Opinion 0 is created by alice at a price whose 10% step lands on an
    // exact 5_000000 target
    fn create_test_market() -> Market {
        let mut registry =
            OpinionRegistry::new(MarketConfig::default(), AccountId::new("admin")).unwrap();
        let mut vault = AssetVault::new();
        for name in ["bob", "carol", "dave"] {
            let account = AccountId::new(name);
            vault.credit(&account, 100_000000).unwrap();
            vault.approve(&account, 100_000000);
        }
        let base = Utc::now();
        registry
            .create_opinion(
                &TxContext::new(AccountId::new("alice"), base),
                "Best L2?",
                "none yet",
                "",
                4_545455,
                vec!["crypto".to_string()],
                "",
                "",
            )
            .unwrap();

        Market {
            registry,
            pools: PoolManager::new(),
            vault,
            base,
        }
    }

    fn ctx_at(market: &Market, name: &str, offset_secs: i64) -> TxContext {
        TxContext::new(
            AccountId::new(name),
            market.base + Duration::seconds(offset_secs),
        )
    }

    fn create_default_pool(market: &mut Market) -> PoolId {
        let ctx = ctx_at(market, "bob", 1);
        market
            .pools
            .create_pool(
                &ctx,
                &market.registry,
                OpinionId::new(0),
                "pooled answer",
                "",
                market.base + Duration::days(7),
            )
            .unwrap()
    }

    #[test]
    fn test_create_pool_snapshots_target() {
        let mut market = create_test_market();
        let pool_id = create_default_pool(&mut market);

        let pool = market.pools.get_pool(pool_id).unwrap();
        assert_eq!(pool.target_price, 5_000000);
        assert_eq!(pool.status, PoolStatus::Open);
        assert_eq!(pool.total_amount, 0);
    }

    #[test]
    fn test_create_pool_rejects_past_deadline_and_bad_answer() {
        let mut market = create_test_market();
        let ctx = ctx_at(&market, "bob", 1);

        let err = market
            .pools
            .create_pool(
                &ctx,
                &market.registry,
                OpinionId::new(0),
                "pooled answer",
                "",
                ctx.now - Duration::seconds(1),
            )
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidInput { .. }));

        let err = market
            .pools
            .create_pool(
                &ctx,
                &market.registry,
                OpinionId::new(0),
                "  ",
                "",
                ctx.now + Duration::days(1),
            )
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidInput { .. }));
    }

    #[test]
    fn test_partial_contribution_stays_open() {
        let mut market = create_test_market();
        let pool_id = create_default_pool(&mut market);

        let ctx = ctx_at(&market, "bob", 2);
        let Market {
            registry,
            pools,
            vault,
            ..
        } = &mut market;
        let accepted = pools
            .add_contribution(&ctx, registry, vault, pool_id, 3_000000)
            .unwrap();
        assert_eq!(accepted, 3_000000);

        let pool = pools.get_pool(pool_id).unwrap();
        assert_eq!(pool.status, PoolStatus::Open);
        assert_eq!(pool.total_amount, 3_000000);
        assert!(pool.verify_sum());
        assert_eq!(vault.balance_of(&AccountId::pool(pool_id)), 3_000000);
    }

    #[test]
    fn test_crossing_contribution_executes_atomically() {
        let mut market = create_test_market();
        let pool_id = create_default_pool(&mut market);

        {
            let ctx = ctx_at(&market, "bob", 2);
            let Market {
                registry,
                pools,
                vault,
                ..
            } = &mut market;
            pools
                .add_contribution(&ctx, registry, vault, pool_id, 3_000000)
                .unwrap();
        }
        {
            let ctx = ctx_at(&market, "carol", 3);
            let Market {
                registry,
                pools,
                vault,
                ..
            } = &mut market;
            pools
                .add_contribution(&ctx, registry, vault, pool_id, 2_000000)
                .unwrap();
        }

        let pool = market.pools.get_pool(pool_id).unwrap();
        assert_eq!(pool.status, PoolStatus::Executed);
        assert_eq!(pool.total_amount, 5_000000);

        // The pool account is the owner of record
        let opinion = market.registry.get_opinion(OpinionId::new(0)).unwrap();
        assert_eq!(opinion.question_owner, AccountId::pool(pool_id));
        assert_eq!(opinion.current_answer, "pooled answer");
        assert_eq!(opinion.last_price, 5_000000);
        assert_eq!(market.registry.get_answer_history(OpinionId::new(0)).count(), 2);

        // Escrow paid the full target out to the fee recipients
        assert_eq!(market.vault.balance_of(&AccountId::pool(pool_id)), 0);
        assert_eq!(
            market.vault.balance_of(&AccountId::new("alice")),
            150000 + 4_750000
        );

        // No further contribution is accepted
        let ctx = ctx_at(&market, "dave", 4);
        let Market {
            registry,
            pools,
            vault,
            ..
        } = &mut market;
        let err = pools
            .add_contribution(&ctx, registry, vault, pool_id, 1_000000)
            .unwrap_err();
        assert!(matches!(err, MarketError::PoolClosed { .. }));
    }

    #[test]
    fn test_marginal_surplus_is_not_consumed() {
        let mut market = create_test_market();
        let pool_id = create_default_pool(&mut market);

        {
            let ctx = ctx_at(&market, "bob", 2);
            let Market {
                registry,
                pools,
                vault,
                ..
            } = &mut market;
            pools
                .add_contribution(&ctx, registry, vault, pool_id, 3_000000)
                .unwrap();
        }
        let ctx = ctx_at(&market, "carol", 3);
        let Market {
            registry,
            pools,
            vault,
            ..
        } = &mut market;
        // carol offers 3_000000 but only the missing 2_000000 is pulled
        let accepted = pools
            .add_contribution(&ctx, registry, vault, pool_id, 3_000000)
            .unwrap();
        assert_eq!(accepted, 2_000000);
        assert_eq!(vault.balance_of(&AccountId::new("carol")), 98_000000);

        let pool = pools.get_pool(pool_id).unwrap();
        assert_eq!(pool.contributions[&AccountId::new("carol")], 2_000000);
        assert!(pool.verify_sum());
    }

    #[test]
    fn test_target_refreshes_to_execution_time_price() {
        let mut market = create_test_market();
        let pool_id = create_default_pool(&mut market);

        {
            let ctx = ctx_at(&market, "bob", 2);
            let Market {
                registry,
                pools,
                vault,
                ..
            } = &mut market;
            pools
                .add_contribution(&ctx, registry, vault, pool_id, 3_000000)
                .unwrap();
        }
        // dave submits directly, raising the required price to 5_500000
        {
            let ctx = ctx_at(&market, "dave", 3);
            market
                .registry
                .submit_answer(
                    &ctx,
                    &mut market.vault,
                    OpinionId::new(0),
                    "direct answer",
                    "",
                    5_000000,
                )
                .unwrap();
        }
        // carol's 2_000000 no longer crosses; the pool keeps filling
        let ctx = ctx_at(&market, "carol", 4);
        let Market {
            registry,
            pools,
            vault,
            ..
        } = &mut market;
        pools
            .add_contribution(&ctx, registry, vault, pool_id, 2_000000)
            .unwrap();

        let pool = pools.get_pool(pool_id).unwrap();
        assert_eq!(pool.target_price, 5_500000);
        assert_eq!(pool.total_amount, 5_000000);
        assert_eq!(pool.status, PoolStatus::Open);
    }

    #[test]
    fn test_contribution_rejected_when_opinion_paused() {
        let mut market = create_test_market();
        let pool_id = create_default_pool(&mut market);
        market
            .registry
            .pause(&ctx_at(&market, "admin", 2), OpinionId::new(0))
            .unwrap();

        let ctx = ctx_at(&market, "bob", 3);
        let Market {
            registry,
            pools,
            vault,
            ..
        } = &mut market;
        let err = pools
            .add_contribution(&ctx, registry, vault, pool_id, 1_000000)
            .unwrap_err();
        assert!(matches!(err, MarketError::Inactive { .. }));
    }

    #[test]
    fn test_withdraw_only_after_close_or_expiry() {
        let mut market = create_test_market();
        let pool_id = create_default_pool(&mut market);
        {
            let ctx = ctx_at(&market, "bob", 2);
            let Market {
                registry,
                pools,
                vault,
                ..
            } = &mut market;
            pools
                .add_contribution(&ctx, registry, vault, pool_id, 3_000000)
                .unwrap();
        }

        // Still open, before the deadline
        let early = ctx_at(&market, "bob", 3);
        let err = market
            .pools
            .withdraw(&early, &mut market.vault, pool_id)
            .unwrap_err();
        assert!(matches!(err, MarketError::PoolClosed { .. }));

        // Past the deadline the refund is available without any cancel call
        let late = TxContext::new(AccountId::new("bob"), market.base + Duration::days(8));
        let refunded = market
            .pools
            .withdraw(&late, &mut market.vault, pool_id)
            .unwrap();
        assert_eq!(refunded, 3_000000);
        assert_eq!(market.vault.balance_of(&AccountId::new("bob")), 100_000000);

        let pool = market.pools.get_pool(pool_id).unwrap();
        assert_eq!(pool.total_amount, 0);
        assert!(pool.verify_sum());
    }

    #[test]
    fn test_independent_refunds_after_expiry() {
        let mut market = create_test_market();
        let pool_id = create_default_pool(&mut market);
        for (name, amount, offset) in [("bob", 2_000000u64, 2i64), ("carol", 1_500000, 3)] {
            let ctx = ctx_at(&market, name, offset);
            let Market {
                registry,
                pools,
                vault,
                ..
            } = &mut market;
            pools
                .add_contribution(&ctx, registry, vault, pool_id, amount)
                .unwrap();
        }

        let after = market.base + Duration::days(8);
        // dave never contributed; his withdrawal fails alone
        let err = market
            .pools
            .withdraw(
                &TxContext::new(AccountId::new("dave"), after),
                &mut market.vault,
                pool_id,
            )
            .unwrap_err();
        assert!(matches!(err, MarketError::NotFound { .. }));

        // Each contributor still gets back exactly their own amount
        for (name, amount) in [("bob", 2_000000u64), ("carol", 1_500000)] {
            let refunded = market
                .pools
                .withdraw(
                    &TxContext::new(AccountId::new(name), after),
                    &mut market.vault,
                    pool_id,
                )
                .unwrap();
            assert_eq!(refunded, amount);
        }

        // A second withdrawal finds nothing
        let err = market
            .pools
            .withdraw(
                &TxContext::new(AccountId::new("bob"), after),
                &mut market.vault,
                pool_id,
            )
            .unwrap_err();
        assert!(matches!(err, MarketError::NotFound { .. }));
    }

    #[test]
    fn test_cancel_lifecycle() {
        let mut market = create_test_market();
        let pool_id = create_default_pool(&mut market);

        let early = ctx_at(&market, "bob", 2);
        let err = market.pools.cancel(&early, pool_id).unwrap_err();
        assert!(matches!(err, MarketError::InvalidInput { .. }));

        let late = TxContext::new(AccountId::new("bob"), market.base + Duration::days(8));
        market.pools.cancel(&late, pool_id).unwrap();
        assert_eq!(
            market.pools.get_pool(pool_id).unwrap().status,
            PoolStatus::Cancelled
        );

        // Cancelled is terminal and closed to contributions
        let err = market.pools.cancel(&late, pool_id).unwrap_err();
        assert!(matches!(err, MarketError::PoolClosed { .. }));
        let Market {
            registry,
            pools,
            vault,
            ..
        } = &mut market;
        let err = pools
            .add_contribution(&late, registry, vault, pool_id, 1_000000)
            .unwrap_err();
        assert!(matches!(err, MarketError::PoolClosed { .. }));
    }

    #[test]
    fn test_pro_rata_earnings_claims() {
        let mut market = create_test_market();
        let pool_id = create_default_pool(&mut market);

        // bob 3/5, carol 2/5; the second contribution executes the pool
        for (name, amount, offset) in [("bob", 3_000000u64, 2i64), ("carol", 2_000000, 3)] {
            let ctx = ctx_at(&market, name, offset);
            let Market {
                registry,
                pools,
                vault,
                ..
            } = &mut market;
            pools
                .add_contribution(&ctx, registry, vault, pool_id, amount)
                .unwrap();
        }

        // No earnings accrued yet
        let err = market
            .pools
            .claim_earnings(
                &ctx_at(&market, "bob", 4),
                &mut market.vault,
                pool_id,
            )
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidInput { .. }));

        // dave outbids the pool; the previous-owner share lands in escrow
        market
            .registry
            .submit_answer(
                &ctx_at(&market, "dave", 5),
                &mut market.vault,
                OpinionId::new(0),
                "outbid",
                "",
                5_500000,
            )
            .unwrap();
        let escrow_income = 5_225000; // 95% of 5_500000
        assert_eq!(
            market.vault.balance_of(&AccountId::pool(pool_id)),
            escrow_income
        );

        let bob_cut = market
            .pools
            .claim_earnings(&ctx_at(&market, "bob", 6), &mut market.vault, pool_id)
            .unwrap();
        assert_eq!(bob_cut, escrow_income * 3 / 5);

        // A second claim with no new income finds nothing
        let err = market
            .pools
            .claim_earnings(&ctx_at(&market, "bob", 7), &mut market.vault, pool_id)
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidInput { .. }));

        let carol_cut = market
            .pools
            .claim_earnings(&ctx_at(&market, "carol", 8), &mut market.vault, pool_id)
            .unwrap();
        assert_eq!(carol_cut, escrow_income * 2 / 5);
        assert_eq!(bob_cut + carol_cut, escrow_income);
        assert_eq!(market.vault.balance_of(&AccountId::pool(pool_id)), 0);

        // Non-contributors have no claim
        let err = market
            .pools
            .claim_earnings(&ctx_at(&market, "dave", 9), &mut market.vault, pool_id)
            .unwrap_err();
        assert!(matches!(err, MarketError::NotFound { .. }));
    }

    #[test]
    fn test_reentrant_entry_rejected() {
        let mut market = create_test_market();
        market.pools.guard.enter().unwrap();

        let ctx = ctx_at(&market, "bob", 1);
        let err = market
            .pools
            .create_pool(
                &ctx,
                &market.registry,
                OpinionId::new(0),
                "pooled answer",
                "",
                ctx.now + Duration::days(7),
            )
            .unwrap_err();
        assert!(matches!(err, MarketError::Reentrancy { .. }));
        market.pools.guard.exit();
    }

    #[test]
    fn test_events_cover_the_pool_lifecycle() {
        let mut market = create_test_market();
        let pool_id = create_default_pool(&mut market);
        for (name, amount, offset) in [("bob", 3_000000u64, 2i64), ("carol", 2_000000, 3)] {
            let ctx = ctx_at(&market, name, offset);
            let Market {
                registry,
                pools,
                vault,
                ..
            } = &mut market;
            pools
                .add_contribution(&ctx, registry, vault, pool_id, amount)
                .unwrap();
        }

        let events = market.pools.drain_events();
        assert!(matches!(events[0], MarketEvent::PoolCreated { .. }));
        assert!(matches!(events[1], MarketEvent::ContributionAdded { .. }));
        assert!(matches!(events[2], MarketEvent::ContributionAdded { .. }));
        assert!(matches!(events[3], MarketEvent::PoolExecuted { .. }));
    }
}
