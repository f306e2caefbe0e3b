//! Conformance Test Module
//!
//! Execution infrastructure for the standardized vectors: per-vector
//! results, per-suite accounting, and the runner trait each suite
//! implements.

pub mod fees;
pub mod pricing;
pub mod scenarios;

use crate::vectors::TestVector;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Conformance test result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceResult {
    /// Test vector ID
    pub vector_id: String,
    /// Whether the test passed
    pub passed: bool,
    /// Execution time
    pub duration_ms: u64,
    /// Error message (if failed)
    pub error: Option<String>,
    /// Additional notes
    pub notes: Option<String>,
}

impl ConformanceResult {
    /// Create a passing result
    pub fn pass(vector_id: impl Into<String>, duration: Duration) -> Self {
        Self {
            vector_id: vector_id.into(),
            passed: true,
            duration_ms: duration.as_millis() as u64,
            error: None,
            notes: None,
        }
    }

    /// Create a failing result
    pub fn fail(
        vector_id: impl Into<String>,
        duration: Duration,
        error: impl Into<String>,
    ) -> Self {
        Self {
            vector_id: vector_id.into(),
            passed: false,
            duration_ms: duration.as_millis() as u64,
            error: Some(error.into()),
            notes: None,
        }
    }

    /// Add notes to result
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Conformance test suite results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResults {
    /// Suite name
    pub name: String,
    /// Total tests
    pub total: usize,
    /// Passed tests
    pub passed: usize,
    /// Failed tests
    pub failed: usize,
    /// Total duration
    pub duration_ms: u64,
    /// Individual results
    pub results: Vec<ConformanceResult>,
}

impl SuiteResults {
    /// Create new suite results
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            total: 0,
            passed: 0,
            failed: 0,
            duration_ms: 0,
            results: Vec::new(),
        }
    }

    /// Add a result
    pub fn add_result(&mut self, result: ConformanceResult) {
        self.total += 1;
        self.duration_ms += result.duration_ms;
        if result.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }

    /// Check if all tests passed
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Get pass rate as percentage
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }
}

/// Trait for conformance test runners
pub trait ConformanceRunner {
    /// The input type for test vectors
    type Input;

    /// Run a single test vector
    fn run_vector(&self, vector: &TestVector<Self::Input>) -> ConformanceResult;

    /// Run all vectors as one named suite
    fn run_suite(&self, name: &str, vectors: &[TestVector<Self::Input>]) -> SuiteResults {
        let mut results = SuiteResults::new(name);
        for vector in vectors {
            results.add_result(self.run_vector(vector));
        }
        results
    }
}

/// Compare an observed outcome against the vector's expectation
pub(crate) fn judge<T>(
    vector: &TestVector<T>,
    outcome: Result<(), String>,
    start: std::time::Instant,
) -> ConformanceResult {
    match (outcome, vector.should_succeed) {
        (Ok(()), true) => ConformanceResult::pass(&vector.id, start.elapsed()),
        (Ok(()), false) => ConformanceResult::fail(
            &vector.id,
            start.elapsed(),
            "expected failure but the operation succeeded",
        ),
        (Err(e), true) => ConformanceResult::fail(
            &vector.id,
            start.elapsed(),
            format!("expected success but failed: {}", e),
        ),
        (Err(_), false) => ConformanceResult::pass(&vector.id, start.elapsed())
            .with_notes("correctly rejected invalid input"),
    }
}
