//! Opinion State
//!
//! An opinion is a tradable question/current-answer pair whose required next
//! price escalates with every accepted submission. Records are created once,
//! mutated only through registry operations, and never deleted.

use super::common::{AccountId, OpinionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opinion lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpinionStatus {
    /// Accepting submissions and trades
    Active,
    /// Paused by an admin; resumable
    Inactive,
    /// Permanently deactivated; terminal
    Delisted,
}

/// Opinion record
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Opinion {
    /// Sequential ID
    pub id: OpinionId,
    /// Immutable, set at creation
    pub creator: AccountId,
    /// Current holder of answer rights
    pub question_owner: AccountId,
    /// Immutable question text
    pub question: String,
    /// Currently accepted answer
    pub current_answer: String,
    /// Description accompanying the current answer
    pub current_answer_description: String,
    /// Owner of the current answer; always equals `question_owner`
    pub current_answer_owner: AccountId,
    /// Last accepted payment
    pub last_price: u64,
    /// Required price for the next submission, derived from `last_price`
    pub next_price: u64,
    /// Secondary-market listing, if any
    pub sale_price: Option<u64>,
    /// Lifecycle status
    pub status: OpinionStatus,
    /// Cumulative sum of all accepted payments
    pub total_volume: u64,
    /// Category tags, unique, validated at creation
    pub categories: Vec<String>,
    /// Opaque external reference
    pub link: String,
    /// Opaque content reference
    pub ipfs_hash: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Opinion {
    /// Whether submissions and trades are currently accepted
    pub fn is_active(&self) -> bool {
        self.status == OpinionStatus::Active
    }

    pub fn is_listed(&self) -> bool {
        self.sale_price.is_some()
    }
}

/// One accepted answer in an opinion's append-only history.
///
/// The creation entry records the creator's seeding answer at the initial
/// price; every later entry records the payment accepted for that
/// submission, so entry prices always sum to the opinion's total volume.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerHistoryEntry {
    /// Accepted answer text
    pub answer: String,
    /// Accompanying description
    pub description: String,
    /// Account the answer was accepted from
    pub owner: AccountId,
    /// Payment accepted for this entry
    pub price: u64,
    /// Acceptance time; non-decreasing within one opinion's history
    pub timestamp: DateTime<Utc>,
}
