//! Scenario Conformance Tests
//!
//! Drives a fresh engine through the standardized end-to-end sequences and
//! verifies the observable invariants after every step: the price chain,
//! volume and history accounting, stale-quote rejection, atomic pool
//! execution, and independent post-expiry refunds.

use super::{judge, ConformanceResult, ConformanceRunner, SuiteResults};
use crate::vectors::{accounts, scenarios as vectors, times, TestVector};
use om_core::{
    AccountId, AssetVault, MarketConfig, MarketError, OpinionId, OpinionRegistry, PoolManager,
    PoolStatus, TxContext,
};
use std::time::Instant;

/// One funded engine per scenario
struct Harness {
    registry: OpinionRegistry,
    pools: PoolManager,
    vault: AssetVault,
    opinion_id: OpinionId,
}

impl Harness {
    fn build(initial_price: u64) -> Result<Self, String> {
        let mut registry = OpinionRegistry::new(MarketConfig::default(), accounts::admin())
            .map_err(|e| e.to_string())?;

        let mut vault = AssetVault::new();
        for buyer in buyers() {
            vault
                .credit(&buyer, 1_000_000_000000)
                .map_err(|e| e.to_string())?;
            vault.approve(&buyer, 1_000_000_000000);
        }

        let opinion_id = registry
            .create_opinion(
                &TxContext::new(accounts::creator(), times::base()),
                "Which rollup settles fastest?",
                "none yet",
                "",
                initial_price,
                vec!["infra".to_string()],
                "",
                "",
            )
            .map_err(|e| e.to_string())?;

        Ok(Self {
            registry,
            pools: PoolManager::new(),
            vault,
            opinion_id,
        })
    }
}

fn buyers() -> [AccountId; 3] {
    [accounts::buyer_1(), accounts::buyer_2(), accounts::buyer_3()]
}

/// Scenario conformance runner
pub struct ScenarioConformanceRunner;

impl ScenarioConformanceRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run all scenario conformance tests
    pub fn run_all(&self) -> SuiteResults {
        let vectors = vectors::all_vectors();
        self.run_suite("scenarios", &vectors)
    }

    fn check(&self, input: &vectors::ScenarioInput) -> Result<(), String> {
        match input.scenario.as_str() {
            vectors::kinds::PRICE_CHAIN => check_price_chain(input),
            vectors::kinds::STALE_QUOTE => check_stale_quote(input),
            vectors::kinds::POOL_THRESHOLD => check_pool_threshold(input),
            vectors::kinds::POOL_REFUND => check_pool_refund(input),
            other => Err(format!("unknown scenario kind '{}'", other)),
        }
    }
}

impl Default for ScenarioConformanceRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ConformanceRunner for ScenarioConformanceRunner {
    type Input = vectors::ScenarioInput;

    fn run_vector(&self, vector: &TestVector<Self::Input>) -> ConformanceResult {
        let start = Instant::now();
        let outcome = self.check(&vector.input);
        judge(vector, outcome, start)
    }
}

/// Run scenario conformance tests
pub fn run_conformance_tests() -> SuiteResults {
    ScenarioConformanceRunner::new().run_all()
}

// ============================================================
// Scenario drivers
// ============================================================

fn check_price_chain(input: &vectors::ScenarioInput) -> Result<(), String> {
    let mut harness = Harness::build(input.initial_price)?;
    let id = harness.opinion_id;
    let buyers = buyers();

    let mut expected_volume = input.initial_price;
    for step in 0..input.submission_count {
        let now = times::offset(step as i64 + 1);
        let quote = harness
            .registry
            .quote_submission(id, &now)
            .map_err(|e| e.to_string())?;

        // Every link: the new requirement is what the last quote derived
        let stored_next = harness
            .registry
            .get_opinion(id)
            .map_err(|e| e.to_string())?
            .next_price;
        if quote.required_price != stored_next {
            return Err(format!(
                "step {}: quote {} disagrees with stored next price {}",
                step, quote.required_price, stored_next
            ));
        }

        let buyer = &buyers[step as usize % buyers.len()];
        harness
            .registry
            .submit_answer(
                &TxContext::new(buyer.clone(), now),
                &mut harness.vault,
                id,
                &format!("answer {}", step),
                "",
                quote.required_price,
            )
            .map_err(|e| format!("step {}: {}", step, e))?;

        expected_volume = expected_volume
            .checked_add(quote.required_price)
            .ok_or("volume overflow in scenario")?;
        let opinion = harness.registry.get_opinion(id).map_err(|e| e.to_string())?;
        if opinion.last_price != quote.required_price {
            return Err(format!("step {}: last price not updated", step));
        }
        if opinion.next_price != quote.next_price_after {
            return Err(format!("step {}: next price not re-derived", step));
        }
        if opinion.total_volume != expected_volume {
            return Err(format!(
                "step {}: volume {} != expected {}",
                step, opinion.total_volume, expected_volume
            ));
        }
    }

    // History mirrors the submissions exactly
    let entries: Vec<_> = harness.registry.get_answer_history(id).collect();
    if entries.len() != input.submission_count as usize + 1 {
        return Err(format!(
            "history has {} entries, expected {}",
            entries.len(),
            input.submission_count + 1
        ));
    }
    let history_volume: u128 = entries.iter().map(|e| e.price as u128).sum();
    if history_volume != expected_volume as u128 {
        return Err("history prices do not sum to the stored volume".to_string());
    }
    if !entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp) {
        return Err("history timestamps decreased".to_string());
    }
    Ok(())
}

fn check_stale_quote(input: &vectors::ScenarioInput) -> Result<(), String> {
    let mut harness = Harness::build(input.initial_price)?;
    let id = harness.opinion_id;

    let original = harness
        .registry
        .quote_submission(id, &times::offset(1))
        .map_err(|e| e.to_string())?;

    harness
        .registry
        .submit_answer(
            &TxContext::new(accounts::buyer_1(), times::offset(1)),
            &mut harness.vault,
            id,
            "first answer",
            "",
            original.required_price,
        )
        .map_err(|e| e.to_string())?;

    // The original quote is now stale and must be rejected, not adjusted
    let result = harness.registry.submit_answer(
        &TxContext::new(accounts::buyer_2(), times::offset(2)),
        &mut harness.vault,
        id,
        "second answer",
        "",
        original.required_price,
    );
    match result {
        Err(MarketError::StalePrice { expected, current }) => {
            if expected != original.required_price || current != original.next_price_after {
                return Err("stale rejection carries the wrong prices".to_string());
            }
        }
        Err(other) => return Err(format!("expected a stale-price rejection, got {}", other)),
        Ok(()) => return Err("stale quote was accepted".to_string()),
    }

    // The failed attempt left no trace
    let opinion = harness.registry.get_opinion(id).map_err(|e| e.to_string())?;
    if opinion.question_owner != accounts::buyer_1() {
        return Err("rejected submission mutated ownership".to_string());
    }
    if harness.registry.get_answer_history(id).count() != 2 {
        return Err("rejected submission appended history".to_string());
    }
    Ok(())
}

fn check_pool_threshold(input: &vectors::ScenarioInput) -> Result<(), String> {
    if input.contributions.is_empty() {
        return Err("threshold scenario requires contributions".to_string());
    }
    let mut harness = Harness::build(input.initial_price)?;
    let id = harness.opinion_id;
    let buyers = buyers();

    let pool_id = harness
        .pools
        .create_pool(
            &TxContext::new(accounts::buyer_1(), times::offset(1)),
            &harness.registry,
            id,
            "pooled answer",
            "",
            times::offset(input.deadline_secs),
        )
        .map_err(|e| e.to_string())?;
    let target = harness
        .pools
        .get_pool(pool_id)
        .map_err(|e| e.to_string())?
        .target_price;

    let last = input.contributions.len() - 1;
    for (step, &offered) in input.contributions.iter().enumerate() {
        let buyer = &buyers[step % buyers.len()];
        let before = harness.vault.balance_of(buyer);
        let accepted = harness
            .pools
            .add_contribution(
                &TxContext::new(buyer.clone(), times::offset(step as i64 + 2)),
                &mut harness.registry,
                &mut harness.vault,
                pool_id,
                offered,
            )
            .map_err(|e| format!("contribution {}: {}", step, e))?;

        // Only what the pool still needed was pulled
        if harness.vault.balance_of(buyer) != before - accepted {
            return Err(format!("contribution {}: pulled amount mismatch", step));
        }
        if accepted > offered {
            return Err(format!("contribution {}: accepted more than offered", step));
        }

        let pool = harness.pools.get_pool(pool_id).map_err(|e| e.to_string())?;
        if !pool.verify_sum() {
            return Err(format!("contribution {}: escrow sum broken", step));
        }
        let expect_executed = step == last;
        match (expect_executed, pool.status) {
            (false, PoolStatus::Open) => {}
            // Crossing the threshold and executing are one step
            (true, PoolStatus::Executed) => {}
            (_, status) => {
                return Err(format!(
                    "contribution {}: unexpected status {:?}",
                    step, status
                ));
            }
        }
    }

    let pool = harness.pools.get_pool(pool_id).map_err(|e| e.to_string())?;
    if pool.total_amount != target {
        return Err("executed pool holds more than the target".to_string());
    }
    let opinion = harness.registry.get_opinion(id).map_err(|e| e.to_string())?;
    if opinion.question_owner != AccountId::pool(pool_id) {
        return Err("pool is not the owner of record".to_string());
    }
    if opinion.last_price != target {
        return Err("execution paid a price other than the target".to_string());
    }
    // The escrow paid the full target out through the fee split
    if harness.vault.balance_of(&AccountId::pool(pool_id)) != 0 {
        return Err("escrow retained funds after execution".to_string());
    }

    // Executed pools accept nothing further
    let result = harness.pools.add_contribution(
        &TxContext::new(accounts::buyer_3(), times::offset(100)),
        &mut harness.registry,
        &mut harness.vault,
        pool_id,
        1_000000,
    );
    match result {
        Err(MarketError::PoolClosed { .. }) => Ok(()),
        Err(other) => Err(format!("expected a closed-pool rejection, got {}", other)),
        Ok(_) => Err("executed pool accepted a contribution".to_string()),
    }
}

fn check_pool_refund(input: &vectors::ScenarioInput) -> Result<(), String> {
    let mut harness = Harness::build(input.initial_price)?;
    let id = harness.opinion_id;
    let buyers = buyers();

    let pool_id = harness
        .pools
        .create_pool(
            &TxContext::new(accounts::buyer_1(), times::offset(1)),
            &harness.registry,
            id,
            "pooled answer",
            "",
            times::offset(input.deadline_secs),
        )
        .map_err(|e| e.to_string())?;

    let mut contributed = Vec::new();
    for (step, &amount) in input.contributions.iter().enumerate() {
        let buyer = &buyers[step % buyers.len()];
        harness
            .pools
            .add_contribution(
                &TxContext::new(buyer.clone(), times::offset(step as i64 + 2)),
                &mut harness.registry,
                &mut harness.vault,
                pool_id,
                amount,
            )
            .map_err(|e| format!("contribution {}: {}", step, e))?;
        contributed.push((buyer.clone(), amount));
    }

    let pool = harness.pools.get_pool(pool_id).map_err(|e| e.to_string())?;
    if pool.status != PoolStatus::Open || pool.total_amount >= pool.target_price {
        return Err("refund scenario requires an underfunded open pool".to_string());
    }

    let after_deadline = times::offset(input.deadline_secs + 1);

    // A stranger's withdrawal fails on its own
    let result = harness.pools.withdraw(
        &TxContext::new(accounts::admin(), after_deadline),
        &mut harness.vault,
        pool_id,
    );
    if result.is_ok() {
        return Err("non-contributor withdrew from the pool".to_string());
    }

    // Each contributor still takes back exactly their own amount
    for (buyer, amount) in &contributed {
        let before = harness.vault.balance_of(buyer);
        let refunded = harness
            .pools
            .withdraw(
                &TxContext::new(buyer.clone(), after_deadline),
                &mut harness.vault,
                pool_id,
            )
            .map_err(|e| format!("refund for {}: {}", buyer, e))?;
        if refunded != *amount {
            return Err(format!(
                "{} refunded {}, contributed {}",
                buyer, refunded, amount
            ));
        }
        if harness.vault.balance_of(buyer) != before + amount {
            return Err(format!("refund for {} not credited", buyer));
        }
    }

    let pool = harness.pools.get_pool(pool_id).map_err(|e| e.to_string())?;
    if pool.total_amount != 0 || !pool.verify_sum() {
        return Err("pool accounting broken after refunds".to_string());
    }
    Ok(())
}
