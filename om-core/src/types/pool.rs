//! Pool State
//!
//! A pool escrows contributions from multiple parties toward a single answer
//! submission against one opinion. Pools are short-lived: they terminate in
//! `Executed` or `Cancelled` and are never reused.

use super::common::{AccountId, OpinionId, PoolId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pool lifecycle status; leaves `Open` exactly once
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolStatus {
    /// Accepting contributions
    Open,
    /// Target reached; the pooled submission was committed
    Executed,
    /// Expired without execution; contributions refundable
    Cancelled,
}

/// Pool record
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pool {
    /// Sequential ID
    pub pool_id: PoolId,
    /// Opinion the pooled submission targets
    pub target_opinion_id: OpinionId,
    /// Answer text the pool intends to submit
    pub target_answer: String,
    /// Description accompanying the intended answer
    pub target_answer_description: String,
    /// Price required at execution time; refreshed from the opinion's
    /// current required price on every contribution
    pub target_price: u64,
    /// Sum of all recorded contributions
    pub total_amount: u64,
    /// Contribution per contributor; keys unique
    pub contributions: HashMap<AccountId, u64>,
    /// Lifecycle status
    pub status: PoolStatus,
    /// Expiry; evaluated lazily on withdraw/cancel
    pub deadline: DateTime<Utc>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Earnings already paid out per contributor (executed pools)
    pub earnings_claimed: HashMap<AccountId, u64>,
    /// Sum of all earnings paid out so far
    pub total_claimed: u64,
}

impl Pool {
    /// The escrow identity holding this pool's funds
    pub fn escrow_account(&self) -> AccountId {
        AccountId::pool(self.pool_id)
    }

    /// Whether the deadline has passed at `now`
    pub fn is_expired(&self, now: &DateTime<Utc>) -> bool {
        *now > self.deadline
    }

    /// Amount still missing before the pool can execute
    pub fn remaining(&self) -> u64 {
        self.target_price.saturating_sub(self.total_amount)
    }

    /// Verify the escrow invariant: recorded contributions sum to the total
    pub fn verify_sum(&self) -> bool {
        let sum: u128 = self.contributions.values().map(|&v| v as u128).sum();
        sum == self.total_amount as u128
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn create_test_pool() -> Pool {
        let now = Utc::now();
        Pool {
            pool_id: PoolId::new(0),
            target_opinion_id: OpinionId::new(0),
            target_answer: "pooled answer".to_string(),
            target_answer_description: String::new(),
            target_price: 5_000000,
            total_amount: 0,
            contributions: HashMap::new(),
            status: PoolStatus::Open,
            deadline: now + Duration::days(7),
            created_at: now,
            earnings_claimed: HashMap::new(),
            total_claimed: 0,
        }
    }

    #[test]
    fn test_remaining_saturates_at_zero() {
        let mut pool = create_test_pool();
        assert_eq!(pool.remaining(), 5_000000);
        pool.total_amount = 5_000000;
        assert_eq!(pool.remaining(), 0);
    }

    #[test]
    fn test_verify_sum() {
        let mut pool = create_test_pool();
        assert!(pool.verify_sum());
        pool.contributions.insert(AccountId::new("bob"), 2_000000);
        assert!(!pool.verify_sum());
        pool.total_amount = 2_000000;
        assert!(pool.verify_sum());
    }

    #[test]
    fn test_expiry_is_strict() {
        let pool = create_test_pool();
        assert!(!pool.is_expired(&pool.deadline));
        assert!(pool.is_expired(&(pool.deadline + Duration::seconds(1))));
    }
}
