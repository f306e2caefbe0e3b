//! Answer History Ledger
//!
//! Append-only per-opinion log of accepted answers. The registry appends as
//! part of a committed submission; readers get an ordered, restartable view
//! that never observes a partially written entry.

use crate::error::{MarketError, MarketResult};
use crate::types::{AnswerHistoryEntry, OpinionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered, immutable answer history per opinion
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AnswerHistoryLedger {
    entries: BTreeMap<OpinionId, Vec<AnswerHistoryEntry>>,
}

impl AnswerHistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an accepted entry.
    ///
    /// Timestamps within one opinion's history are non-decreasing; an
    /// out-of-order append means the caller broke the transaction ordering
    /// contract and is surfaced instead of silently reordering.
    pub fn append(&mut self, opinion_id: OpinionId, entry: AnswerHistoryEntry) -> MarketResult<()> {
        let log = self.entries.entry(opinion_id).or_default();
        if let Some(last) = log.last() {
            if entry.timestamp < last.timestamp {
                return Err(MarketError::InvariantViolation {
                    invariant: "history timestamps non-decreasing".to_string(),
                    details: format!(
                        "opinion {}: {} after {}",
                        opinion_id, entry.timestamp, last.timestamp
                    ),
                });
            }
        }
        log.push(entry);
        Ok(())
    }

    /// Ordered iterator over an opinion's entries; empty for unknown ids
    pub fn history(&self, opinion_id: OpinionId) -> impl Iterator<Item = &AnswerHistoryEntry> {
        self.entries
            .get(&opinion_id)
            .map(|log| log.as_slice())
            .unwrap_or(&[])
            .iter()
    }

    /// Number of accepted entries for an opinion
    pub fn len(&self, opinion_id: OpinionId) -> usize {
        self.entries.get(&opinion_id).map(|log| log.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, opinion_id: OpinionId) -> bool {
        self.len(opinion_id) == 0
    }

    /// Most recent entry, if any
    pub fn last(&self, opinion_id: OpinionId) -> Option<&AnswerHistoryEntry> {
        self.entries.get(&opinion_id).and_then(|log| log.last())
    }

    /// Sum of entry prices, widened against overflow
    pub fn volume(&self, opinion_id: OpinionId) -> u128 {
        self.history(opinion_id).map(|e| e.price as u128).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccountId;
    use chrono::{Duration, Utc};

    fn create_test_entry(price: u64, offset_secs: i64) -> AnswerHistoryEntry {
        AnswerHistoryEntry {
            answer: format!("answer at {}", price),
            description: String::new(),
            owner: AccountId::new("alice"),
            price,
            timestamp: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn test_append_preserves_order() {
        let mut ledger = AnswerHistoryLedger::new();
        let id = OpinionId::new(0);
        ledger.append(id, create_test_entry(1_000000, 0)).unwrap();
        ledger.append(id, create_test_entry(1_100000, 10)).unwrap();
        ledger.append(id, create_test_entry(1_210000, 20)).unwrap();

        let prices: Vec<u64> = ledger.history(id).map(|e| e.price).collect();
        assert_eq!(prices, vec![1_000000, 1_100000, 1_210000]);
        assert_eq!(ledger.len(id), 3);
        assert_eq!(ledger.volume(id), 3_310000);
    }

    #[test]
    fn test_equal_timestamps_allowed() {
        let mut ledger = AnswerHistoryLedger::new();
        let id = OpinionId::new(0);
        let entry = create_test_entry(1_000000, 0);
        ledger.append(id, entry.clone()).unwrap();
        ledger.append(id, entry).unwrap();
        assert_eq!(ledger.len(id), 2);
    }

    #[test]
    fn test_out_of_order_append_rejected() {
        let mut ledger = AnswerHistoryLedger::new();
        let id = OpinionId::new(0);
        ledger.append(id, create_test_entry(1_000000, 10)).unwrap();
        let err = ledger
            .append(id, create_test_entry(1_100000, 0))
            .unwrap_err();
        assert!(matches!(err, MarketError::InvariantViolation { .. }));
        // Nothing was appended
        assert_eq!(ledger.len(id), 1);
    }

    #[test]
    fn test_unknown_opinion_reads_empty() {
        let ledger = AnswerHistoryLedger::new();
        let id = OpinionId::new(42);
        assert!(ledger.is_empty(id));
        assert!(ledger.last(id).is_none());
        assert_eq!(ledger.history(id).count(), 0);
    }

    #[test]
    fn test_histories_are_isolated_per_opinion() {
        let mut ledger = AnswerHistoryLedger::new();
        ledger
            .append(OpinionId::new(0), create_test_entry(1_000000, 0))
            .unwrap();
        ledger
            .append(OpinionId::new(1), create_test_entry(2_000000, 0))
            .unwrap();

        assert_eq!(ledger.len(OpinionId::new(0)), 1);
        assert_eq!(ledger.len(OpinionId::new(1)), 1);
        assert_eq!(ledger.last(OpinionId::new(1)).unwrap().price, 2_000000);
    }

    #[test]
    fn test_iterator_is_restartable() {
        let mut ledger = AnswerHistoryLedger::new();
        let id = OpinionId::new(0);
        ledger.append(id, create_test_entry(1_000000, 0)).unwrap();

        let first: Vec<_> = ledger.history(id).collect();
        let second: Vec<_> = ledger.history(id).collect();
        assert_eq!(first, second);
    }
}
