//! Pricing Test Vectors
//!
//! Inputs and expected outputs for the next-price derivation.

use super::TestVector;
use serde::{Deserialize, Serialize};

/// Pricing test input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingInput {
    /// Last accepted price in smallest units
    pub last_price: u64,
    /// Growth per step in basis points
    pub growth_bps: u64,
}

/// Get all pricing test vectors
pub fn all_vectors() -> Vec<TestVector<PricingInput>> {
    let mut vectors = Vec::new();
    vectors.extend(exact_steps());
    vectors.extend(rounding_and_floors());
    vectors.extend(failure_cases());
    vectors
}

/// Steps with an exactly representable increment
pub fn exact_steps() -> Vec<TestVector<PricingInput>> {
    vec![
        TestVector::new(
            "price-001",
            "10% step on one whole unit",
            PricingInput {
                last_price: 1_000000,
                growth_bps: 1_000,
            },
        )
        .with_expected(serde_json::json!({"next_price": 1_100000}))
        .with_tags(vec!["exact", "default-growth"]),
        TestVector::new(
            "price-002",
            "Chained second step compounds on the first",
            PricingInput {
                last_price: 1_100000,
                growth_bps: 1_000,
            },
        )
        .with_expected(serde_json::json!({"next_price": 1_210000}))
        .with_tags(vec!["exact", "default-growth"]),
        TestVector::new(
            "price-003",
            "5% growth",
            PricingInput {
                last_price: 1_000000,
                growth_bps: 500,
            },
        )
        .with_expected(serde_json::json!({"next_price": 1_050000}))
        .with_tags(vec!["exact"]),
        TestVector::new(
            "price-004",
            "Maximum 100% growth doubles the price",
            PricingInput {
                last_price: 1_000000,
                growth_bps: 10_000,
            },
        )
        .with_expected(serde_json::json!({"next_price": 2_000000}))
        .with_tags(vec!["exact", "max-growth"]),
    ]
}

/// Round-down and minimum-step behavior
pub fn rounding_and_floors() -> Vec<TestVector<PricingInput>> {
    vec![
        TestVector::new(
            "price-005",
            "Fractional increment is discarded",
            PricingInput {
                last_price: 15,
                growth_bps: 1_000,
            },
        )
        .with_expected(serde_json::json!({"next_price": 16}))
        .with_tags(vec!["rounding"]),
        TestVector::new(
            "price-006",
            "Increment below one unit is floored to one",
            PricingInput {
                last_price: 1,
                growth_bps: 1_000,
            },
        )
        .with_expected(serde_json::json!({"next_price": 2}))
        .with_tags(vec!["rounding", "floor"]),
        TestVector::new(
            "price-007",
            "Zero input still produces a strictly larger price",
            PricingInput {
                last_price: 0,
                growth_bps: 1_000,
            },
        )
        .with_expected(serde_json::json!({"next_price": 1}))
        .with_tags(vec!["floor", "edge"]),
        TestVector::new(
            "price-008",
            "Large input stays monotonic with a bounded step",
            PricingInput {
                last_price: u64::MAX / 4,
                growth_bps: 1_000,
            },
        )
        .with_tags(vec!["monotonic", "large"]),
    ]
}

/// Inputs the calculator must reject
pub fn failure_cases() -> Vec<TestVector<PricingInput>> {
    vec![TestVector::new(
        "price-009",
        "Next price past the asset range is an overflow error",
        PricingInput {
            last_price: u64::MAX,
            growth_bps: 1_000,
        },
    )
    .should_fail()
    .with_tags(vec!["overflow"])]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_ids_are_unique() {
        let vectors = all_vectors();
        let mut ids: Vec<_> = vectors.iter().map(|v| v.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), vectors.len());
    }

    #[test]
    fn test_failure_vectors_are_marked() {
        assert!(failure_cases().iter().all(|v| !v.should_succeed));
    }
}
