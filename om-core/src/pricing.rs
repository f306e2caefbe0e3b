//! Price Escalation
//!
//! Pure next-price derivation. No state, no side effects: identical input
//! always produces identical output, so the registry can re-derive the
//! required price at commit time and reject stale quotes.

use crate::config::PricingConfig;
use crate::error::{MarketError, MarketResult};
use crate::types::BPS_DENOMINATOR;

/// Deterministic next-price function.
///
/// Guarantees, for every `last` it accepts:
/// - strictly increasing: `next_price(last) > last`
/// - bounded growth: the step never exceeds `growth_bps` of `last`
///   (validated against [`crate::config::MAX_GROWTH_BPS`] at deployment)
/// - rounds down: the fractional part of the increment is discarded, never
///   inflating the required price beyond the configured proportion
/// - overflow-checked against the asset's `u64` range
#[derive(Clone, Debug)]
pub struct PriceCalculator {
    growth_bps: u64,
    min_price: u64,
    max_price: u64,
}

impl PriceCalculator {
    pub fn new(config: &PricingConfig) -> Self {
        Self {
            growth_bps: config.growth_bps,
            min_price: config.min_price,
            max_price: config.max_price,
        }
    }

    /// Floor for initial prices
    pub fn min_price(&self) -> u64 {
        self.min_price
    }

    /// Ceiling for initial prices
    pub fn max_price(&self) -> u64 {
        self.max_price
    }

    /// Whether `price` is acceptable as an opinion's initial price
    pub fn initial_price_in_bounds(&self, price: u64) -> bool {
        price >= self.min_price && price <= self.max_price
    }

    /// Derive the required price following an accepted payment of `last`.
    ///
    /// The increment is `last * growth_bps / 10_000` with the division
    /// rounding down, floored at one smallest unit so the sequence stays
    /// strictly increasing even for degenerate inputs.
    pub fn next_price(&self, last: u64) -> MarketResult<u64> {
        let increment = (last as u128)
            .checked_mul(self.growth_bps as u128)
            .map(|raw| raw / BPS_DENOMINATOR as u128)
            .ok_or_else(|| MarketError::ArithmeticOverflow {
                context: "price increment".to_string(),
            })?;
        let increment = increment.max(1);

        let next = (last as u128) + increment;
        u64::try_from(next).map_err(|_| MarketError::ArithmeticOverflow {
            context: "next price".to_string(),
        })
    }
}
