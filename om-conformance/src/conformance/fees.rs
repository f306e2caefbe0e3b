//! Fee Split Conformance Tests
//!
//! Validates each vector's deployment configuration, computes the split,
//! and verifies the exact-sum guarantee and the expected shares.

use super::{judge, ConformanceResult, ConformanceRunner, SuiteResults};
use crate::vectors::{accounts, fees as vectors, TestVector};
use om_core::{AccountId, FeeConfig, FeeManager, MarketConfig, RoleTable};
use std::time::Instant;

/// Fee split conformance runner
pub struct FeeConformanceRunner;

impl FeeConformanceRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run all fee conformance tests
    pub fn run_all(&self) -> SuiteResults {
        let vectors = vectors::all_vectors();
        self.run_suite("fees", &vectors)
    }

    fn check(
        &self,
        input: &vectors::FeeInput,
        expected: Option<&serde_json::Value>,
    ) -> Result<(), String> {
        let fee_config = FeeConfig {
            creator_bps: input.creator_bps,
            owner_bps: input.owner_bps,
            treasury_bps: input.treasury_bps,
            ..FeeConfig::default()
        };
        // The deployment gate catches inconsistent proportions
        MarketConfig {
            fees: fee_config.clone(),
            ..MarketConfig::default()
        }
        .validate()
        .map_err(|e| e.to_string())?;

        let manager = FeeManager::new(fee_config);
        let roles = RoleTable::seeded(&accounts::admin(), &AccountId::registry());
        let split = manager
            .distribute(
                &roles,
                &AccountId::registry(),
                input.payment,
                &accounts::creator(),
                &accounts::buyer_1(),
            )
            .map_err(|e| e.to_string())?;

        if !split.verify_sum() {
            return Err(format!(
                "shares {} + {} + {} do not sum to {}",
                split.creator_share, split.owner_share, split.treasury_share, input.payment
            ));
        }

        if let Some(expected) = expected {
            for (field, actual) in [
                ("creator_share", split.creator_share),
                ("owner_share", split.owner_share),
                ("treasury_share", split.treasury_share),
            ] {
                if let Some(want) = expected.get(field).and_then(|v| v.as_u64()) {
                    if actual != want {
                        return Err(format!("{}: expected {}, got {}", field, want, actual));
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for FeeConformanceRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ConformanceRunner for FeeConformanceRunner {
    type Input = vectors::FeeInput;

    fn run_vector(&self, vector: &TestVector<Self::Input>) -> ConformanceResult {
        let start = Instant::now();
        let outcome = self.check(&vector.input, vector.expected.as_ref());
        judge(vector, outcome, start)
    }
}

/// Run fee conformance tests
pub fn run_conformance_tests() -> SuiteResults {
    FeeConformanceRunner::new().run_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fee_vectors_pass() {
        let results = run_conformance_tests();
        assert!(results.total > 0);
        assert!(
            results.all_passed(),
            "fee conformance: {}/{} passed",
            results.passed,
            results.total
        );
    }

    #[test]
    fn test_unauthorized_distribution_is_rejected() {
        let manager = FeeManager::new(FeeConfig::default());
        let roles = RoleTable::seeded(&accounts::admin(), &AccountId::registry());
        let result = manager.distribute(
            &roles,
            &accounts::buyer_1(),
            1_000000,
            &accounts::creator(),
            &accounts::buyer_2(),
        );
        assert!(result.is_err());
    }
}
