//! Deployment Configuration
//!
//! Fee proportions, pricing parameters, and input limits are fixed at
//! deployment. `MarketConfig::validate` rejects inconsistent deployments
//! before any engine is constructed. Values can be overridden from the
//! environment with the `OM_` prefix.

use crate::error::{MarketError, MarketResult};
use crate::types::{AccountId, BPS_DENOMINATOR};
use serde::{Deserialize, Serialize};
use std::env;

/// Upper bound on the per-step growth proportion (100%)
pub const MAX_GROWTH_BPS: u64 = 10_000;

/// Price escalation parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Growth per accepted submission, in basis points of the last price
    #[serde(default = "default_growth_bps")]
    pub growth_bps: u64,
    /// Floor for initial prices, in smallest units
    #[serde(default = "default_min_price")]
    pub min_price: u64,
    /// Ceiling for initial prices, in smallest units
    #[serde(default = "default_max_price")]
    pub max_price: u64,
}

fn default_growth_bps() -> u64 {
    1_000 // 10%
}

fn default_min_price() -> u64 {
    1_000000 // 1.0 at 6 decimals
}

fn default_max_price() -> u64 {
    100_000_000000 // 100k whole units
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            growth_bps: default_growth_bps(),
            min_price: default_min_price(),
            max_price: default_max_price(),
        }
    }
}

/// Fee split proportions; must sum to exactly [`BPS_DENOMINATOR`]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Share of every payment routed to the opinion's creator
    #[serde(default = "default_creator_bps")]
    pub creator_bps: u64,
    /// Share routed to the previous question owner
    #[serde(default = "default_owner_bps")]
    pub owner_bps: u64,
    /// Share retained by the platform treasury; also receives the
    /// integer-division remainder
    #[serde(default = "default_treasury_bps")]
    pub treasury_bps: u64,
    /// Treasury account
    #[serde(default = "default_treasury_account")]
    pub treasury: AccountId,
}

fn default_creator_bps() -> u64 {
    300 // 3%
}

fn default_owner_bps() -> u64 {
    9_500 // 95%
}

fn default_treasury_bps() -> u64 {
    200 // 2%
}

fn default_treasury_account() -> AccountId {
    AccountId::new("om:treasury")
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            creator_bps: default_creator_bps(),
            owner_bps: default_owner_bps(),
            treasury_bps: default_treasury_bps(),
            treasury: default_treasury_account(),
        }
    }
}

/// Input length and cardinality limits
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_question_len")]
    pub max_question_len: usize,
    #[serde(default = "default_max_answer_len")]
    pub max_answer_len: usize,
    #[serde(default = "default_max_description_len")]
    pub max_description_len: usize,
    #[serde(default = "default_max_link_len")]
    pub max_link_len: usize,
    #[serde(default = "default_max_categories")]
    pub max_categories: usize,
}

fn default_max_question_len() -> usize {
    200
}

fn default_max_answer_len() -> usize {
    120
}

fn default_max_description_len() -> usize {
    500
}

fn default_max_link_len() -> usize {
    256
}

fn default_max_categories() -> usize {
    3
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_question_len: default_max_question_len(),
            max_answer_len: default_max_answer_len(),
            max_description_len: default_max_description_len(),
            max_link_len: default_max_link_len(),
            max_categories: default_max_categories(),
        }
    }
}

/// Full deployment configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MarketConfig {
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub fees: FeeConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl MarketConfig {
    /// Load defaults and apply environment overrides.
    ///
    /// Environment variables:
    /// - `OM_GROWTH_BPS`: price growth per submission in basis points
    /// - `OM_MIN_PRICE`: initial-price floor in smallest units
    /// - `OM_MAX_PRICE`: initial-price ceiling in smallest units
    /// - `OM_CREATOR_BPS` / `OM_OWNER_BPS` / `OM_TREASURY_BPS`: fee split
    /// - `OM_TREASURY_ACCOUNT`: treasury account id
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = env_u64("OM_GROWTH_BPS") {
            config.pricing.growth_bps = v;
        }
        if let Some(v) = env_u64("OM_MIN_PRICE") {
            config.pricing.min_price = v;
        }
        if let Some(v) = env_u64("OM_MAX_PRICE") {
            config.pricing.max_price = v;
        }
        if let Some(v) = env_u64("OM_CREATOR_BPS") {
            config.fees.creator_bps = v;
        }
        if let Some(v) = env_u64("OM_OWNER_BPS") {
            config.fees.owner_bps = v;
        }
        if let Some(v) = env_u64("OM_TREASURY_BPS") {
            config.fees.treasury_bps = v;
        }
        if let Ok(v) = env::var("OM_TREASURY_ACCOUNT") {
            config.fees.treasury = AccountId::new(v);
        }

        config
    }

    /// Reject inconsistent deployments
    pub fn validate(&self) -> MarketResult<()> {
        if self.pricing.growth_bps == 0 || self.pricing.growth_bps > MAX_GROWTH_BPS {
            return Err(MarketError::invalid_input(format!(
                "growth_bps {} outside (0, {}]",
                self.pricing.growth_bps, MAX_GROWTH_BPS
            )));
        }
        if self.pricing.min_price == 0 {
            return Err(MarketError::invalid_input("min_price must be positive"));
        }
        if self.pricing.min_price > self.pricing.max_price {
            return Err(MarketError::invalid_input(format!(
                "min_price {} exceeds max_price {}",
                self.pricing.min_price, self.pricing.max_price
            )));
        }

        let bps_sum = self.fees.creator_bps + self.fees.owner_bps + self.fees.treasury_bps;
        if bps_sum != BPS_DENOMINATOR {
            return Err(MarketError::invalid_input(format!(
                "fee proportions sum to {} bps, expected {}",
                bps_sum, BPS_DENOMINATOR
            )));
        }
        if self.fees.treasury.as_str().is_empty() {
            return Err(MarketError::invalid_input("treasury account is empty"));
        }

        if self.limits.max_question_len == 0
            || self.limits.max_answer_len == 0
            || self.limits.max_categories == 0
        {
            return Err(MarketError::invalid_input("limits must be positive"));
        }

        Ok(())
    }
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
