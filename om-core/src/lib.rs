//! Opinion Marketplace Ledger Engine
//!
//! The authoritative state machine behind the opinion/answer marketplace:
//! a deterministic, sequentially processed ledger enforcing monotonic
//! pricing, atomic fee splitting, and crowdfunded escrow.
//!
//! # Components
//!
//! - [`PriceCalculator`]: pure next-price derivation, strictly increasing
//!   with bounded growth and round-down arithmetic
//! - [`FeeManager`]: role-gated basis-point split of every accepted payment
//!   among creator, previous owner, and treasury, exact to the unit
//! - [`AnswerHistoryLedger`]: append-only per-opinion log of accepted
//!   answers
//! - [`OpinionRegistry`]: per-opinion state and the transaction
//!   orchestrator for creation, submission, the secondary market, and
//!   admin lifecycle changes
//! - [`PoolManager`]: escrow letting multiple parties jointly fund one
//!   submission, executed atomically when the target is reached
//! - [`AssetVault`]: balances and pre-authorized allowances for the
//!   payment asset, moved only through checked transfer plans
//!
//! # Transaction discipline
//!
//! Every state-mutating entry point runs the same sequence: reject
//! reentrant entry, validate against current state, build and check the
//! complete transfer plan, commit all internal bookkeeping, apply the plan.
//! Failures before the commit point leave zero partial effect; committed
//! mutations each append one [`MarketEvent`] for the off-chain indexer.

pub mod config;
pub mod error;
pub mod fees;
pub mod ledger;
pub mod pool;
pub mod pricing;
pub mod registry;
pub mod roles;
pub mod types;
pub mod vault;

// Re-export error types
pub use error::{MarketError, MarketResult};

// Re-export all types
pub use types::*;

// Re-export configuration
pub use config::{FeeConfig, LimitsConfig, MarketConfig, PricingConfig, MAX_GROWTH_BPS};

// Re-export components
pub use fees::{FeeManager, FeeSplit};
pub use ledger::AnswerHistoryLedger;
pub use pool::PoolManager;
pub use pricing::PriceCalculator;
pub use registry::{OpinionRegistry, SubmissionQuote};
pub use roles::{Role, RoleTable};
pub use vault::{AssetVault, TransferLeg, TransferPlan};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Ledger protocol version
pub const PROTOCOL_VERSION: &str = "v1";

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(PROTOCOL_VERSION, "v1");
    }

    #[test]
    fn test_default_deployment_end_to_end() {
        let mut registry =
            OpinionRegistry::new(MarketConfig::default(), AccountId::new("admin")).unwrap();
        let mut vault = AssetVault::new();
        vault.credit(&AccountId::new("bob"), 10_000000).unwrap();
        vault.approve(&AccountId::new("bob"), 10_000000);

        let ctx = TxContext::new(AccountId::new("alice"), Utc::now());
        let id = registry
            .create_opinion(
                &ctx,
                "Best L2?",
                "none yet",
                "",
                1_000000,
                vec!["crypto".to_string()],
                "",
                "",
            )
            .unwrap();

        let quote = registry.quote_submission(id, &Utc::now()).unwrap();
        registry
            .submit_answer(
                &TxContext::new(AccountId::new("bob"), Utc::now()),
                &mut vault,
                id,
                "an answer",
                "",
                quote.required_price,
            )
            .unwrap();

        let opinion = registry.get_opinion(id).unwrap();
        assert_eq!(opinion.question_owner, AccountId::new("bob"));
        assert_eq!(opinion.next_price, quote.next_price_after);
    }
}
