//! Test Vectors Module
//!
//! Standardized inputs and expected outputs for the marketplace engine.
//! Vectors are deterministic: times come from a fixed base instant and all
//! amounts are plain smallest-unit integers, so any implementation of the
//! engine can be checked against the same data.

pub mod fees;
pub mod pricing;
pub mod scenarios;

use serde::{Deserialize, Serialize};

/// Test vector for any operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestVector<T> {
    /// Test vector ID
    pub id: String,
    /// Description
    pub description: String,
    /// Input data
    pub input: T,
    /// Expected output (if applicable)
    pub expected: Option<serde_json::Value>,
    /// Whether this should succeed
    pub should_succeed: bool,
    /// Tags for categorization
    pub tags: Vec<String>,
}

impl<T> TestVector<T> {
    /// Create a new test vector
    pub fn new(id: impl Into<String>, description: impl Into<String>, input: T) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            input,
            expected: None,
            should_succeed: true,
            tags: Vec::new(),
        }
    }

    /// Set expected output
    pub fn with_expected(mut self, expected: serde_json::Value) -> Self {
        self.expected = Some(expected);
        self
    }

    /// Mark as should fail
    pub fn should_fail(mut self) -> Self {
        self.should_succeed = false;
        self
    }

    /// Add tags
    pub fn with_tags(mut self, tags: Vec<&str>) -> Self {
        self.tags = tags.into_iter().map(String::from).collect();
        self
    }
}

/// Standard amounts for testing, in smallest units at 6 decimals
pub mod amounts {
    /// One whole unit
    pub fn one_unit() -> u64 {
        1_000000
    }

    /// Smallest non-zero amount
    pub fn dust() -> u64 {
        1
    }

    /// Typical submission price
    pub fn typical() -> u64 {
        2_500000
    }

    /// Large but safely escalatable amount
    pub fn large() -> u64 {
        100_000_000000
    }
}

/// Standard accounts for testing
pub mod accounts {
    use om_core::AccountId;

    pub fn admin() -> AccountId {
        AccountId::new("conf:admin")
    }

    pub fn creator() -> AccountId {
        AccountId::new("conf:creator")
    }

    pub fn buyer_1() -> AccountId {
        AccountId::new("conf:buyer:001")
    }

    pub fn buyer_2() -> AccountId {
        AccountId::new("conf:buyer:002")
    }

    pub fn buyer_3() -> AccountId {
        AccountId::new("conf:buyer:003")
    }
}

/// Deterministic transaction times
pub mod times {
    use chrono::{DateTime, Duration, Utc};

    /// Fixed base instant every scenario starts from
    pub fn base() -> DateTime<Utc> {
        DateTime::UNIX_EPOCH + Duration::seconds(1_750_000_000)
    }

    /// `secs` after the base instant
    pub fn offset(secs: i64) -> DateTime<Utc> {
        base() + Duration::seconds(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_vector_creation() {
        let vector: TestVector<u64> = TestVector::new("test-001", "A description", 7);
        assert_eq!(vector.id, "test-001");
        assert!(vector.should_succeed);
        assert!(vector.expected.is_none());
    }

    #[test]
    fn test_test_vector_should_fail() {
        let vector: TestVector<u64> = TestVector::new("test-002", "Failure case", 0).should_fail();
        assert!(!vector.should_succeed);
    }

    #[test]
    fn test_test_vector_with_expected() {
        let vector: TestVector<u64> = TestVector::new("test-003", "Expected case", 1)
            .with_expected(serde_json::json!({"next_price": 2}));
        assert!(vector.expected.is_some());
    }

    #[test]
    fn test_times_are_deterministic() {
        assert_eq!(times::base(), times::base());
        assert!(times::offset(10) > times::base());
    }

    #[test]
    fn test_accounts_are_external() {
        assert!(!accounts::buyer_1().is_protocol());
        assert_ne!(accounts::buyer_1(), accounts::buyer_2());
    }
}
