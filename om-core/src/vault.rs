//! Asset Vault
//!
//! Deterministic ledger for the external fixed-point payment asset: balances
//! and pre-authorized pull allowances per account. Entry points never move
//! value directly; they build a [`TransferPlan`], verify it with
//! [`AssetVault::check_plan`] before touching any state, and apply it with
//! [`AssetVault::apply_plan`] only after their own bookkeeping is committed.
//! A checked plan cannot fail under sequential application, so the apply step
//! never unwinds committed state.

use crate::error::{MarketError, MarketResult};
use crate::types::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One value movement inside a transaction.
///
/// A `pull` leg spends the source account's pre-authorized allowance; a
/// `direct` leg moves funds the protocol already holds in escrow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLeg {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: u64,
    /// Whether this leg consumes the source account's allowance
    pub pulled: bool,
}

impl TransferLeg {
    /// Leg paid from an external account's pre-authorization
    pub fn pull(from: AccountId, to: AccountId, amount: u64) -> Self {
        Self {
            from,
            to,
            amount,
            pulled: true,
        }
    }

    /// Leg paid from protocol-held escrow
    pub fn direct(from: AccountId, to: AccountId, amount: u64) -> Self {
        Self {
            from,
            to,
            amount,
            pulled: false,
        }
    }
}

/// Ordered set of transfer legs applied sequentially as one unit
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPlan {
    legs: Vec<TransferLeg>,
}

impl TransferPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a leg; zero-amount legs are dropped
    pub fn push(&mut self, leg: TransferLeg) {
        if leg.amount > 0 {
            self.legs.push(leg);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    pub fn legs(&self) -> &[TransferLeg] {
        &self.legs
    }

    /// Sum of all leg amounts, widened against overflow
    pub fn total(&self) -> u128 {
        self.legs.iter().map(|leg| leg.amount as u128).sum()
    }
}

/// Balances and pull allowances for every account the engine has seen
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AssetVault {
    balances: HashMap<AccountId, u64>,
    allowances: HashMap<AccountId, u64>,
}

impl AssetVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Remaining amount the protocol may pull from `account`
    pub fn allowance_of(&self, account: &AccountId) -> u64 {
        self.allowances.get(account).copied().unwrap_or(0)
    }

    /// Deposit external funds into an account; the bridging surface that
    /// funds accounts lives outside the engine
    pub fn credit(&mut self, account: &AccountId, amount: u64) -> MarketResult<()> {
        let balance = self.balances.entry(account.clone()).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| MarketError::ArithmeticOverflow {
                context: format!("credit to {}", account),
            })?;
        Ok(())
    }

    /// Pre-authorize the protocol to pull up to `amount` from the caller.
    /// Replaces any previous authorization.
    pub fn approve(&mut self, owner: &AccountId, amount: u64) {
        self.allowances.insert(owner.clone(), amount);
    }

    /// Verify `plan` is feasible under sequential application without
    /// mutating anything
    pub fn check_plan(&self, plan: &TransferPlan) -> MarketResult<()> {
        let mut shadow = self.clone();
        shadow.apply_plan(plan)
    }

    /// Apply every leg of `plan` in order. Callers check the plan first;
    /// a checked plan cannot fail here.
    pub fn apply_plan(&mut self, plan: &TransferPlan) -> MarketResult<()> {
        for leg in plan.legs() {
            self.apply_leg(leg)?;
        }
        Ok(())
    }

    fn apply_leg(&mut self, leg: &TransferLeg) -> MarketResult<()> {
        if leg.pulled {
            let allowance = self.allowance_of(&leg.from);
            if allowance < leg.amount {
                return Err(MarketError::InsufficientFunds {
                    account: leg.from.to_string(),
                    required: leg.amount,
                    available: allowance,
                });
            }
        }

        let balance = self.balance_of(&leg.from);
        if balance < leg.amount {
            return Err(MarketError::InsufficientFunds {
                account: leg.from.to_string(),
                required: leg.amount,
                available: balance,
            });
        }

        let credited = self
            .balance_of(&leg.to)
            .checked_add(leg.amount)
            .ok_or_else(|| MarketError::ArithmeticOverflow {
                context: format!("transfer to {}", leg.to),
            })?;

        if leg.pulled {
            self.allowances
                .insert(leg.from.clone(), self.allowance_of(&leg.from) - leg.amount);
        }
        self.balances.insert(leg.from.clone(), balance - leg.amount);
        self.balances.insert(leg.to.clone(), credited);

        Ok(())
    }

    /// Sum of all balances, widened against overflow
    pub fn total_supply(&self) -> u128 {
        self.balances.values().map(|&v| v as u128).sum()
    }
}
