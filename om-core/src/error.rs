//! Error Registry
//!
//! Every failure aborts the enclosing transaction with no partial effect and
//! is surfaced synchronously with a specific kind. There is no local recovery
//! path inside a transaction; callers re-fetch state and resubmit where that
//! makes sense (notably after `StalePrice`).

use thiserror::Error;

/// Market result type
pub type MarketResult<T> = Result<T, MarketError>;

/// Market error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// Malformed creation/submission parameters, rejected before any state change
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Operation attempted on a disabled opinion
    #[error("opinion {opinion_id} is not active")]
    Inactive { opinion_id: u64 },

    /// Submission price no longer matches the current required price;
    /// the caller must re-quote and retry
    #[error("stale price: expected {expected}, current required price is {current}")]
    StalePrice { expected: u64, current: u64 },

    /// Payment pull failed against the caller's balance or pre-authorization
    #[error("insufficient funds: account {account} short {required} (available {available})")]
    InsufficientFunds {
        account: String,
        required: u64,
        available: u64,
    },

    /// Caller lacks the required role
    #[error("unauthorized: {caller} lacks role {role}")]
    Unauthorized { caller: String, role: String },

    /// Contribution/withdrawal attempted outside the pool's valid status window
    #[error("pool {pool_id} closed for this operation: {reason}")]
    PoolClosed { pool_id: u64, reason: String },

    /// Entity lookup failed
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Nested call into a state-mutating entry point before the current
    /// transaction finalized its state changes
    #[error("reentrant call into {component} rejected")]
    Reentrancy { component: String },

    /// Checked fixed-point arithmetic overflowed the asset's range
    #[error("arithmetic overflow in {context}")]
    ArithmeticOverflow { context: String },

    /// Internal consistency failure; surfaced instead of panicking
    #[error("invariant violation: {invariant} - {details}")]
    InvariantViolation { invariant: String, details: String },
}

impl MarketError {
    /// Shorthand for input validation failures
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Shorthand for lookup failures
    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_context() {
        let err = MarketError::StalePrice {
            expected: 1_000000,
            current: 1_100000,
        };
        let msg = err.to_string();
        assert!(msg.contains("1000000"));
        assert!(msg.contains("1100000"));
    }

    #[test]
    fn test_invalid_input_shorthand() {
        let err = MarketError::invalid_input("empty question");
        assert_eq!(
            err,
            MarketError::InvalidInput {
                reason: "empty question".to_string()
            }
        );
    }

    #[test]
    fn test_not_found_shorthand() {
        let err = MarketError::not_found("Opinion", 7);
        assert_eq!(
            err,
            MarketError::NotFound {
                entity: "Opinion".to_string(),
                id: "7".to_string()
            }
        );
    }
}
