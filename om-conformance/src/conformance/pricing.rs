//! Pricing Conformance Tests
//!
//! Checks the next-price derivation against the standardized vectors:
//! exact expected values where given, and the monotonic/bounded-step
//! guarantees everywhere.

use super::{judge, ConformanceResult, ConformanceRunner, SuiteResults};
use crate::vectors::{pricing as vectors, TestVector};
use om_core::{PriceCalculator, PricingConfig};
use std::time::Instant;

/// Pricing conformance runner
pub struct PricingConformanceRunner;

impl PricingConformanceRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run all pricing conformance tests
    pub fn run_all(&self) -> SuiteResults {
        let vectors = vectors::all_vectors();
        self.run_suite("pricing", &vectors)
    }

    fn check(&self, input: &vectors::PricingInput, expected: Option<u64>) -> Result<(), String> {
        let calculator = PriceCalculator::new(&PricingConfig {
            growth_bps: input.growth_bps,
            ..PricingConfig::default()
        });

        let next = calculator
            .next_price(input.last_price)
            .map_err(|e| e.to_string())?;

        if next <= input.last_price {
            return Err(format!("{} is not above {}", next, input.last_price));
        }
        let max_step =
            ((input.last_price as u128 * input.growth_bps as u128) / 10_000).max(1);
        if (next - input.last_price) as u128 > max_step {
            return Err(format!(
                "step {} exceeds the configured bound {}",
                next - input.last_price,
                max_step
            ));
        }
        // Referential transparency: a second derivation must agree
        let again = calculator
            .next_price(input.last_price)
            .map_err(|e| e.to_string())?;
        if again != next {
            return Err("derivation is not deterministic".to_string());
        }

        if let Some(expected) = expected {
            if next != expected {
                return Err(format!("expected {}, derived {}", expected, next));
            }
        }
        Ok(())
    }
}

impl Default for PricingConformanceRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ConformanceRunner for PricingConformanceRunner {
    type Input = vectors::PricingInput;

    fn run_vector(&self, vector: &TestVector<Self::Input>) -> ConformanceResult {
        let start = Instant::now();
        let expected = vector
            .expected
            .as_ref()
            .and_then(|e| e.get("next_price"))
            .and_then(|v| v.as_u64());
        let outcome = self.check(&vector.input, expected);
        judge(vector, outcome, start)
    }
}

/// Run pricing conformance tests
pub fn run_conformance_tests() -> SuiteResults {
    PricingConformanceRunner::new().run_all()
}
