//! Basic Types
//!
//! Naming conventions:
//! - `_id` suffix: primary key identifiers
//! - amounts: `u64` in the payment asset's smallest unit, widened to `u128`
//!   for intermediate arithmetic

use crate::error::{MarketError, MarketResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Basis points denominator; fee proportions and growth steps are expressed
/// in hundredths of a percent
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Decimal precision of the payment asset; `1_000000` is one whole unit
pub const PRICE_DECIMALS: u32 = 6;

// ============================================================
// ID Types
// ============================================================

/// Opinion ID, assigned sequentially by the registry
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OpinionId(pub u64);

impl OpinionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for OpinionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pool ID, assigned sequentially by the pool manager
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PoolId(pub u64);

impl PoolId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PoolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account identity of a caller or a protocol-owned escrow
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The registry's own escrow identity; fee disbursement flows through it
    pub fn registry() -> Self {
        Self("om:registry".to_string())
    }

    /// Escrow identity owned by a pool; contributions and accrued earnings
    /// are held here
    pub fn pool(pool_id: PoolId) -> Self {
        Self(format!("om:pool:{}", pool_id))
    }

    /// Whether this is a protocol-owned escrow rather than an external caller
    pub fn is_protocol(&self) -> bool {
        self.0.starts_with("om:")
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================
// Transaction Context
// ============================================================

/// Per-transaction context supplied by the execution environment.
///
/// The engine never reads a wall clock; `now` is the time at which the
/// environment accepted the transaction, which also fixes the ordering of
/// history entries and the evaluation point for pool deadlines.
#[derive(Clone, Debug)]
pub struct TxContext {
    /// Authenticated caller
    pub caller: AccountId,
    /// Transaction acceptance time
    pub now: DateTime<Utc>,
}

impl TxContext {
    pub fn new(caller: AccountId, now: DateTime<Utc>) -> Self {
        Self { caller, now }
    }

    /// Context for an action a component performs on behalf of a
    /// protocol-owned account within the same transaction
    pub fn on_behalf_of(&self, account: AccountId) -> Self {
        Self {
            caller: account,
            now: self.now,
        }
    }
}

// ============================================================
// Entry Guard
// ============================================================

/// Explicit reentrancy rejection for a component's state-mutating entry
/// points.
///
/// The guard is held for the full validate-plan-commit-apply sequence of one
/// transaction; a nested call into the same component before the sequence
/// finishes fails with [`MarketError::Reentrancy`]. Cross-component nesting
/// (pool manager invoking the registry) uses each component's own guard.
#[derive(Debug, Default)]
pub struct EntryGuard {
    component: &'static str,
    active: bool,
}

impl EntryGuard {
    pub fn new(component: &'static str) -> Self {
        Self {
            component,
            active: false,
        }
    }

    /// Mark a transaction in flight; fails if one already is
    pub fn enter(&mut self) -> MarketResult<()> {
        if self.active {
            return Err(MarketError::Reentrancy {
                component: self.component.to_string(),
            });
        }
        self.active = true;
        Ok(())
    }

    /// Release the guard; called on every exit path
    pub fn exit(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
