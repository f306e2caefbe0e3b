//! Fee Split Test Vectors
//!
//! Inputs and expected outputs for the three-way payment split. Every
//! successful vector must split without creating or destroying a single
//! unit; the remainder always lands in the treasury share.

use super::TestVector;
use serde::{Deserialize, Serialize};

/// Fee split test input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeInput {
    /// Payment to split, in smallest units
    pub payment: u64,
    /// Creator share in basis points
    pub creator_bps: u64,
    /// Previous-owner share in basis points
    pub owner_bps: u64,
    /// Treasury share in basis points
    pub treasury_bps: u64,
}

/// Get all fee split test vectors
pub fn all_vectors() -> Vec<TestVector<FeeInput>> {
    let mut vectors = Vec::new();
    vectors.extend(exact_splits());
    vectors.extend(remainder_cases());
    vectors.extend(invalid_configurations());
    vectors
}

/// Splits with no rounding remainder
pub fn exact_splits() -> Vec<TestVector<FeeInput>> {
    vec![
        TestVector::new(
            "fee-001",
            "Default 3/95/2 split on one whole unit",
            FeeInput {
                payment: 1_000000,
                creator_bps: 300,
                owner_bps: 9_500,
                treasury_bps: 200,
            },
        )
        .with_expected(serde_json::json!({
            "creator_share": 30000,
            "owner_share": 950000,
            "treasury_share": 20000,
        }))
        .with_tags(vec!["exact", "default-split"]),
        TestVector::new(
            "fee-002",
            "Even thirds-style split on a round payment",
            FeeInput {
                payment: 10_000,
                creator_bps: 2_000,
                owner_bps: 5_000,
                treasury_bps: 3_000,
            },
        )
        .with_expected(serde_json::json!({
            "creator_share": 2_000,
            "owner_share": 5_000,
            "treasury_share": 3_000,
        }))
        .with_tags(vec!["exact"]),
        TestVector::new(
            "fee-003",
            "Zero payment splits to zero everywhere",
            FeeInput {
                payment: 0,
                creator_bps: 300,
                owner_bps: 9_500,
                treasury_bps: 200,
            },
        )
        .with_expected(serde_json::json!({
            "creator_share": 0,
            "owner_share": 0,
            "treasury_share": 0,
        }))
        .with_tags(vec!["edge"]),
    ]
}

/// Splits whose rounding remainder must land in the treasury
pub fn remainder_cases() -> Vec<TestVector<FeeInput>> {
    vec![
        TestVector::new(
            "fee-004",
            "Both proportional shares round down on a tiny payment",
            FeeInput {
                payment: 33,
                creator_bps: 300,
                owner_bps: 9_500,
                treasury_bps: 200,
            },
        )
        .with_expected(serde_json::json!({
            "creator_share": 0,
            "owner_share": 31,
            "treasury_share": 2,
        }))
        .with_tags(vec!["remainder"]),
        TestVector::new(
            "fee-005",
            "Single smallest unit goes entirely to the treasury",
            FeeInput {
                payment: 1,
                creator_bps: 300,
                owner_bps: 9_500,
                treasury_bps: 200,
            },
        )
        .with_expected(serde_json::json!({
            "creator_share": 0,
            "owner_share": 0,
            "treasury_share": 1,
        }))
        .with_tags(vec!["remainder", "edge"]),
        TestVector::new(
            "fee-006",
            "Awkward 3333/3333/3334 proportions stay exact",
            FeeInput {
                payment: 100,
                creator_bps: 3_333,
                owner_bps: 3_333,
                treasury_bps: 3_334,
            },
        )
        .with_expected(serde_json::json!({
            "creator_share": 33,
            "owner_share": 33,
            "treasury_share": 34,
        }))
        .with_tags(vec!["remainder"]),
        TestVector::new(
            "fee-007",
            "Large payment splits without precision loss",
            FeeInput {
                payment: u64::MAX / 2,
                creator_bps: 300,
                owner_bps: 9_500,
                treasury_bps: 200,
            },
        )
        .with_tags(vec!["remainder", "large"]),
    ]
}

/// Deployment configurations that must be rejected
pub fn invalid_configurations() -> Vec<TestVector<FeeInput>> {
    vec![
        TestVector::new(
            "fee-008",
            "Proportions summing below 100% are rejected",
            FeeInput {
                payment: 1_000000,
                creator_bps: 300,
                owner_bps: 9_500,
                treasury_bps: 199,
            },
        )
        .should_fail()
        .with_tags(vec!["invalid-config"]),
        TestVector::new(
            "fee-009",
            "Proportions summing above 100% are rejected",
            FeeInput {
                payment: 1_000000,
                creator_bps: 300,
                owner_bps: 9_500,
                treasury_bps: 201,
            },
        )
        .should_fail()
        .with_tags(vec!["invalid-config"]),
    ]
}
