//! Fee Distribution
//!
//! Splits every accepted submission payment among the opinion's creator, the
//! previous question owner, and the platform treasury by fixed basis-point
//! proportions. Only the registry's protocol identity holds the distributor
//! role; any other caller is rejected before a single share is computed.

use crate::config::FeeConfig;
use crate::error::{MarketError, MarketResult};
use crate::roles::{Role, RoleTable};
use crate::types::{AccountId, BPS_DENOMINATOR};
use crate::vault::TransferLeg;
use serde::{Deserialize, Serialize};

/// Exact three-way split of one payment.
///
/// Creator and previous-owner shares round down; the treasury receives the
/// integer-division remainder, so the three shares always sum to the payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub payment: u64,
    pub creator: AccountId,
    pub creator_share: u64,
    pub previous_owner: AccountId,
    pub owner_share: u64,
    pub treasury: AccountId,
    pub treasury_share: u64,
}

impl FeeSplit {
    /// Verify no value was created or destroyed
    pub fn verify_sum(&self) -> bool {
        self.creator_share as u128 + self.owner_share as u128 + self.treasury_share as u128
            == self.payment as u128
    }

    /// Transfer legs paying each share out of `payer`.
    ///
    /// `pulled` selects allowance-backed legs for external payers and direct
    /// legs for protocol escrow accounts. Zero shares produce no leg.
    pub fn legs(&self, payer: &AccountId, pulled: bool) -> Vec<TransferLeg> {
        let make = |to: &AccountId, amount: u64| {
            if pulled {
                TransferLeg::pull(payer.clone(), to.clone(), amount)
            } else {
                TransferLeg::direct(payer.clone(), to.clone(), amount)
            }
        };

        [
            make(&self.creator, self.creator_share),
            make(&self.previous_owner, self.owner_share),
            make(&self.treasury, self.treasury_share),
        ]
        .into_iter()
        .filter(|leg| leg.amount > 0)
        .collect()
    }
}

/// Role-gated payment splitter
#[derive(Clone, Debug)]
pub struct FeeManager {
    config: FeeConfig,
}

impl FeeManager {
    pub fn new(config: FeeConfig) -> Self {
        Self { config }
    }

    pub fn treasury(&self) -> &AccountId {
        &self.config.treasury
    }

    /// Split `payment` among creator, previous owner, and treasury.
    ///
    /// `caller` must hold [`Role::FeeDistributor`]; proportions were
    /// validated to sum to 100% when the deployment configuration was
    /// accepted.
    pub fn distribute(
        &self,
        roles: &RoleTable,
        caller: &AccountId,
        payment: u64,
        creator: &AccountId,
        previous_owner: &AccountId,
    ) -> MarketResult<FeeSplit> {
        roles.require(caller, Role::FeeDistributor)?;

        let creator_share = share_of(payment, self.config.creator_bps)?;
        let owner_share = share_of(payment, self.config.owner_bps)?;
        // Remainder to the treasury keeps the sum exact
        let treasury_share = payment - creator_share - owner_share;

        let split = FeeSplit {
            payment,
            creator: creator.clone(),
            creator_share,
            previous_owner: previous_owner.clone(),
            owner_share,
            treasury: self.config.treasury.clone(),
            treasury_share,
        };

        tracing::debug!(
            payment,
            creator_share = split.creator_share,
            owner_share = split.owner_share,
            treasury_share = split.treasury_share,
            "fee split computed"
        );

        Ok(split)
    }
}

/// `amount * bps / 10_000` rounded down, widened against overflow
fn share_of(amount: u64, bps: u64) -> MarketResult<u64> {
    let raw = (amount as u128)
        .checked_mul(bps as u128)
        .ok_or_else(|| MarketError::ArithmeticOverflow {
            context: "fee share".to_string(),
        })?
        / BPS_DENOMINATOR as u128;
    u64::try_from(raw).map_err(|_| MarketError::ArithmeticOverflow {
        context: "fee share".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeeConfig;

    fn create_test_manager() -> (FeeManager, RoleTable) {
        let manager = FeeManager::new(FeeConfig::default());
        let roles = RoleTable::seeded(&AccountId::new("admin"), &AccountId::registry());
        (manager, roles)
    }

    #[test]
    fn test_default_split() {
        let (manager, roles) = create_test_manager();
        let split = manager
            .distribute(
                &roles,
                &AccountId::registry(),
                1_000000,
                &AccountId::new("carol"),
                &AccountId::new("bob"),
            )
            .unwrap();

        assert_eq!(split.creator_share, 30000); // 3%
        assert_eq!(split.owner_share, 950000); // 95%
        assert_eq!(split.treasury_share, 20000); // 2%
        assert!(split.verify_sum());
    }

    #[test]
    fn test_remainder_goes_to_treasury() {
        let (manager, roles) = create_test_manager();
        // 3% of 33 and 95% of 33 both round down; the lost units land in
        // the treasury share
        let split = manager
            .distribute(
                &roles,
                &AccountId::registry(),
                33,
                &AccountId::new("carol"),
                &AccountId::new("bob"),
            )
            .unwrap();

        assert_eq!(split.creator_share, 0);
        assert_eq!(split.owner_share, 31);
        assert_eq!(split.treasury_share, 2);
        assert!(split.verify_sum());
    }

    #[test]
    fn test_exact_sum_over_awkward_payments() {
        let (manager, roles) = create_test_manager();
        for payment in [0u64, 1, 7, 99, 101, 9999, 1_234567, u64::MAX / 2] {
            let split = manager
                .distribute(
                    &roles,
                    &AccountId::registry(),
                    payment,
                    &AccountId::new("carol"),
                    &AccountId::new("bob"),
                )
                .unwrap();
            assert!(split.verify_sum(), "leaked at payment {}", payment);
        }
    }

    #[test]
    fn test_non_registry_caller_rejected() {
        let (manager, roles) = create_test_manager();
        let err = manager
            .distribute(
                &roles,
                &AccountId::new("mallory"),
                1_000000,
                &AccountId::new("carol"),
                &AccountId::new("bob"),
            )
            .unwrap_err();
        assert!(matches!(err, MarketError::Unauthorized { .. }));
    }

    #[test]
    fn test_legs_skip_zero_shares() {
        let (manager, roles) = create_test_manager();
        let split = manager
            .distribute(
                &roles,
                &AccountId::registry(),
                33,
                &AccountId::new("carol"),
                &AccountId::new("bob"),
            )
            .unwrap();

        // Creator share rounded to zero, so only two legs remain
        let legs = split.legs(&AccountId::new("buyer"), true);
        assert_eq!(legs.len(), 2);
        assert!(legs.iter().all(|leg| leg.pulled));
        let total: u64 = legs.iter().map(|leg| leg.amount).sum();
        assert_eq!(total, 33);
    }

    #[test]
    fn test_direct_legs_for_escrow_payer() {
        let (manager, roles) = create_test_manager();
        let split = manager
            .distribute(
                &roles,
                &AccountId::registry(),
                1_000000,
                &AccountId::new("carol"),
                &AccountId::new("bob"),
            )
            .unwrap();

        let escrow = AccountId::pool(crate::types::PoolId::new(1));
        let legs = split.legs(&escrow, false);
        assert_eq!(legs.len(), 3);
        assert!(legs.iter().all(|leg| !leg.pulled && leg.from == escrow));
    }
}
