//! Change Notifications
//!
//! One event is appended for every committed mutation; a reverted
//! transaction emits nothing. The off-chain indexer drains these to keep its
//! read-optimized mirror current.

use super::common::{AccountId, OpinionId, PoolId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Committed-mutation notification
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MarketEvent {
    OpinionCreated {
        opinion_id: OpinionId,
        creator: AccountId,
        initial_price: u64,
        timestamp: DateTime<Utc>,
    },
    AnswerSubmitted {
        opinion_id: OpinionId,
        owner: AccountId,
        previous_owner: AccountId,
        price: u64,
        next_price: u64,
        timestamp: DateTime<Utc>,
    },
    OpinionListed {
        opinion_id: OpinionId,
        seller: AccountId,
        price: u64,
        timestamp: DateTime<Utc>,
    },
    ListingCancelled {
        opinion_id: OpinionId,
        seller: AccountId,
        timestamp: DateTime<Utc>,
    },
    OpinionSold {
        opinion_id: OpinionId,
        seller: AccountId,
        buyer: AccountId,
        price: u64,
        timestamp: DateTime<Utc>,
    },
    OpinionPaused {
        opinion_id: OpinionId,
        timestamp: DateTime<Utc>,
    },
    OpinionResumed {
        opinion_id: OpinionId,
        timestamp: DateTime<Utc>,
    },
    OpinionDelisted {
        opinion_id: OpinionId,
        timestamp: DateTime<Utc>,
    },
    RoleGranted {
        account: AccountId,
        role: String,
        timestamp: DateTime<Utc>,
    },
    RoleRevoked {
        account: AccountId,
        role: String,
        timestamp: DateTime<Utc>,
    },
    PoolCreated {
        pool_id: PoolId,
        target_opinion_id: OpinionId,
        target_price: u64,
        deadline: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },
    ContributionAdded {
        pool_id: PoolId,
        contributor: AccountId,
        amount: u64,
        total_amount: u64,
        timestamp: DateTime<Utc>,
    },
    PoolExecuted {
        pool_id: PoolId,
        target_opinion_id: OpinionId,
        price: u64,
        timestamp: DateTime<Utc>,
    },
    PoolCancelled {
        pool_id: PoolId,
        timestamp: DateTime<Utc>,
    },
    ContributionWithdrawn {
        pool_id: PoolId,
        contributor: AccountId,
        amount: u64,
        timestamp: DateTime<Utc>,
    },
    EarningsClaimed {
        pool_id: PoolId,
        contributor: AccountId,
        amount: u64,
        timestamp: DateTime<Utc>,
    },
}
