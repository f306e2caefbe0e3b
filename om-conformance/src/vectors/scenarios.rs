//! Scenario Test Vectors
//!
//! End-to-end sequences exercised against a fresh engine: price-chain and
//! volume accounting over repeated submissions, stale-quote rejection,
//! threshold-crossing pool execution, and post-expiry refunds.

use super::TestVector;
use serde::{Deserialize, Serialize};

/// Scenario kinds the runner knows how to drive
pub mod kinds {
    /// N submissions; verifies the price chain, volume, and history
    pub const PRICE_CHAIN: &str = "price_chain";
    /// A submission with an outdated quote must be rejected
    pub const STALE_QUOTE: &str = "stale_quote";
    /// The contribution crossing the target executes the pool atomically
    pub const POOL_THRESHOLD: &str = "pool_threshold";
    /// Expired underfunded pools refund each contributor independently
    pub const POOL_REFUND: &str = "pool_refund";
}

/// Scenario test input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInput {
    /// One of the [`kinds`] constants
    pub scenario: String,
    /// Initial price the opinion is created at
    pub initial_price: u64,
    /// Number of paid submissions (price-chain scenarios)
    pub submission_count: u32,
    /// Contribution sequence (pool scenarios), one contributor each
    pub contributions: Vec<u64>,
    /// Pool deadline, seconds after the base instant
    pub deadline_secs: i64,
}

impl ScenarioInput {
    fn price_chain(initial_price: u64, submission_count: u32) -> Self {
        Self {
            scenario: kinds::PRICE_CHAIN.to_string(),
            initial_price,
            submission_count,
            contributions: Vec::new(),
            deadline_secs: 0,
        }
    }

    fn pool(scenario: &str, initial_price: u64, contributions: Vec<u64>, deadline_secs: i64) -> Self {
        Self {
            scenario: scenario.to_string(),
            initial_price,
            submission_count: 0,
            contributions,
            deadline_secs,
        }
    }
}

/// Get all scenario test vectors
pub fn all_vectors() -> Vec<TestVector<ScenarioInput>> {
    vec![
        TestVector::new(
            "scen-001",
            "Five-step price chain with exact volume accounting",
            ScenarioInput::price_chain(1_000000, 5),
        )
        .with_tags(vec!["price-chain", "volume", "history"]),
        TestVector::new(
            "scen-002",
            "Longer chain keeps every link and timestamp ordered",
            ScenarioInput::price_chain(2_500000, 12),
        )
        .with_tags(vec!["price-chain", "volume", "history"]),
        TestVector::new(
            "scen-003",
            "Reused original quote fails after an intervening submission",
            ScenarioInput {
                scenario: kinds::STALE_QUOTE.to_string(),
                initial_price: 1_000000,
                submission_count: 0,
                contributions: Vec::new(),
                deadline_secs: 0,
            },
        )
        .with_tags(vec!["stale-quote"]),
        TestVector::new(
            "scen-004",
            "3 then 2 fills a 5-unit target and executes in one step",
            ScenarioInput::pool(
                kinds::POOL_THRESHOLD,
                4_545455, // 10% step lands on an exact 5_000000 target
                vec![3_000000, 2_000000],
                86_400,
            ),
        )
        .with_tags(vec!["pool", "threshold"]),
        TestVector::new(
            "scen-005",
            "Marginal contributor's surplus is left untouched",
            ScenarioInput::pool(
                kinds::POOL_THRESHOLD,
                4_545455,
                vec![3_000000, 9_999999],
                86_400,
            ),
        )
        .with_tags(vec!["pool", "threshold", "surplus"]),
        TestVector::new(
            "scen-006",
            "Underfunded pool refunds each contributor after expiry",
            ScenarioInput::pool(
                kinds::POOL_REFUND,
                4_545455,
                vec![2_000000, 1_500000],
                3_600,
            ),
        )
        .with_tags(vec!["pool", "refund", "expiry"]),
    ]
}
