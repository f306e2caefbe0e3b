//! Opinion Marketplace Conformance Testing
//!
//! Standardized test vectors and conformance suites for the marketplace
//! ledger engine. The vectors pin down the behavior any implementation
//! must reproduce: exact next-price derivations, exact-to-the-unit fee
//! splits, and the end-to-end scenarios around stale quotes, atomic pool
//! execution, and post-expiry refunds.
//!
//! # Running All Conformance Tests
//!
//! ```rust
//! use om_conformance::run_all_conformance_tests;
//!
//! let results = run_all_conformance_tests();
//! assert!(results.all_passed());
//! ```
//!
//! # Running Specific Suites
//!
//! ```rust
//! use om_conformance::conformance::{fees, pricing, scenarios};
//!
//! let pricing_results = pricing::run_conformance_tests();
//! println!("pricing: {}/{} passed", pricing_results.passed, pricing_results.total);
//!
//! let fee_results = fees::run_conformance_tests();
//! let scenario_results = scenarios::run_conformance_tests();
//! # let _ = (fee_results, scenario_results);
//! ```
//!
//! # Suites
//!
//! - **Pricing**: next-price derivation, rounding, floors, overflow
//! - **Fees**: three-way split exactness and remainder assignment
//! - **Scenarios**: price chains, stale-quote rejection, pool threshold
//!   execution, independent refunds

pub mod conformance;
pub mod vectors;

pub use conformance::{ConformanceResult, ConformanceRunner, SuiteResults};

/// Conformance crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run all conformance test suites
pub fn run_all_conformance_tests() -> AllConformanceResults {
    AllConformanceResults {
        pricing: conformance::pricing::run_conformance_tests(),
        fees: conformance::fees::run_conformance_tests(),
        scenarios: conformance::scenarios::run_conformance_tests(),
    }
}

/// Results from all conformance test suites
#[derive(Debug)]
pub struct AllConformanceResults {
    /// Pricing conformance results
    pub pricing: SuiteResults,
    /// Fee split conformance results
    pub fees: SuiteResults,
    /// Scenario conformance results
    pub scenarios: SuiteResults,
}

impl AllConformanceResults {
    /// Check if all tests passed
    pub fn all_passed(&self) -> bool {
        self.pricing.all_passed() && self.fees.all_passed() && self.scenarios.all_passed()
    }

    /// Get total test count
    pub fn total_tests(&self) -> usize {
        self.pricing.total + self.fees.total + self.scenarios.total
    }

    /// Get total passed count
    pub fn total_passed(&self) -> usize {
        self.pricing.passed + self.fees.passed + self.scenarios.passed
    }

    /// Get total failed count
    pub fn total_failed(&self) -> usize {
        self.pricing.failed + self.fees.failed + self.scenarios.failed
    }

    /// Get overall pass rate as percentage
    pub fn pass_rate(&self) -> f64 {
        let total = self.total_tests();
        if total == 0 {
            100.0
        } else {
            (self.total_passed() as f64 / total as f64) * 100.0
        }
    }

    /// Print summary to stdout
    pub fn print_summary(&self) {
        println!("=== Marketplace Conformance Results ===\n");
        println!("Pricing:   {}/{} passed", self.pricing.passed, self.pricing.total);
        println!("Fees:      {}/{} passed", self.fees.passed, self.fees.total);
        println!(
            "Scenarios: {}/{} passed",
            self.scenarios.passed, self.scenarios.total
        );
        println!("\n---");
        println!(
            "Total: {}/{} tests passed ({:.1}%)",
            self.total_passed(),
            self.total_tests(),
            self.pass_rate()
        );

        if !self.all_passed() {
            for suite in [&self.pricing, &self.fees, &self.scenarios] {
                for result in &suite.results {
                    if !result.passed {
                        println!("  FAIL: {} - {:?}", result.vector_id, result.error);
                    }
                }
            }
        }
    }
}
