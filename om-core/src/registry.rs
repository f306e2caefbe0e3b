//! Opinion Registry
//!
//! Owns per-opinion state and orchestrates creation, paid answer submission,
//! the secondary market, and admin lifecycle changes. Every state-mutating
//! operation runs the same transaction discipline: validate, build and check
//! the transfer plan, commit all internal bookkeeping, then apply the plan.
//! Failures before the commit point leave zero partial effect; the plan was
//! checked, so the apply step cannot fail after state is committed.

use crate::config::MarketConfig;
use crate::error::{MarketError, MarketResult};
use crate::fees::FeeManager;
use crate::ledger::AnswerHistoryLedger;
use crate::pricing::PriceCalculator;
use crate::roles::{Role, RoleTable};
use crate::types::{
    AccountId, AnswerHistoryEntry, EntryGuard, MarketEvent, Opinion, OpinionId, OpinionStatus,
    TxContext,
};
use crate::vault::{AssetVault, TransferLeg, TransferPlan};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Price facts for a prospective submission, evaluated at one transaction
/// time.
///
/// The quote re-derives everything a submission will need, so a caller that
/// submits in the same transaction cannot fail on price grounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmissionQuote {
    /// Payment the next submission must supply exactly
    pub required_price: u64,
    /// Required price after that submission commits
    pub next_price_after: u64,
}

/// Authoritative opinion store and transaction orchestrator
pub struct OpinionRegistry {
    calculator: PriceCalculator,
    fees: FeeManager,
    roles: RoleTable,
    ledger: AnswerHistoryLedger,
    opinions: BTreeMap<OpinionId, Opinion>,
    next_id: u64,
    events: Vec<MarketEvent>,
    guard: EntryGuard,
    config: MarketConfig,
}

impl OpinionRegistry {
    /// Construct a registry for a validated deployment configuration.
    ///
    /// The capability table is seeded with `admin` and the registry's own
    /// protocol identity as fee distributor.
    pub fn new(config: MarketConfig, admin: AccountId) -> MarketResult<Self> {
        config.validate()?;
        Ok(Self {
            calculator: PriceCalculator::new(&config.pricing),
            fees: FeeManager::new(config.fees.clone()),
            roles: RoleTable::seeded(&admin, &AccountId::registry()),
            ledger: AnswerHistoryLedger::new(),
            opinions: BTreeMap::new(),
            next_id: 0,
            events: Vec::new(),
            guard: EntryGuard::new("registry"),
            config,
        })
    }

    // ============================================================
    // Read-only queries
    // ============================================================

    pub fn get_opinion(&self, opinion_id: OpinionId) -> MarketResult<&Opinion> {
        self.opinions
            .get(&opinion_id)
            .ok_or_else(|| MarketError::not_found("Opinion", opinion_id))
    }

    /// Count of opinions created; also the id the next creation receives
    pub fn next_opinion_id(&self) -> u64 {
        self.next_id
    }

    /// Ordered, restartable view of an opinion's accepted answers
    pub fn get_answer_history(
        &self,
        opinion_id: OpinionId,
    ) -> impl Iterator<Item = &AnswerHistoryEntry> {
        self.ledger.history(opinion_id)
    }

    pub fn roles(&self) -> &RoleTable {
        &self.roles
    }

    /// Take all events committed since the last drain
    pub fn drain_events(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.events)
    }

    /// Re-derive the price facts a submission against `opinion_id` would be
    /// held to at transaction time `now`.
    ///
    /// Verifies the opinion is active and that the follow-on price and
    /// volume arithmetic cannot overflow, so a submission in the same
    /// transaction has no remaining price-side failure mode.
    pub fn quote_submission(
        &self,
        opinion_id: OpinionId,
        now: &DateTime<Utc>,
    ) -> MarketResult<SubmissionQuote> {
        let opinion = self.get_opinion(opinion_id)?;
        if !opinion.is_active() {
            return Err(MarketError::Inactive {
                opinion_id: opinion_id.value(),
            });
        }

        let required_price = opinion.next_price;
        let next_price_after = self.calculator.next_price(required_price)?;
        opinion
            .total_volume
            .checked_add(required_price)
            .ok_or_else(|| MarketError::ArithmeticOverflow {
                context: "total volume".to_string(),
            })?;

        if let Some(last) = self.ledger.last(opinion_id) {
            if last.timestamp > *now {
                return Err(MarketError::InvariantViolation {
                    invariant: "history timestamps non-decreasing".to_string(),
                    details: format!("transaction time precedes last entry for {}", opinion_id),
                });
            }
        }

        Ok(SubmissionQuote {
            required_price,
            next_price_after,
        })
    }

    /// Validate submission text against the deployment limits without
    /// touching any state. Used by the pool layer before escrowing funds
    /// toward an answer that could never be accepted.
    pub fn validate_submission_text(&self, answer: &str, description: &str) -> MarketResult<()> {
        validate_text("answer", answer, self.config.limits.max_answer_len, true)?;
        validate_text(
            "description",
            description,
            self.config.limits.max_description_len,
            false,
        )
    }

    // ============================================================
    // Creation
    // ============================================================

    /// Create an opinion with the caller as creator and initial question
    /// owner. Pulls no payment; the first history entry anchors the volume
    /// accounting at `initial_price`.
    #[allow(clippy::too_many_arguments)]
    pub fn create_opinion(
        &mut self,
        ctx: &TxContext,
        question: &str,
        answer: &str,
        description: &str,
        initial_price: u64,
        categories: Vec<String>,
        link: &str,
        ipfs_hash: &str,
    ) -> MarketResult<OpinionId> {
        self.guard.enter()?;
        let result = self.create_opinion_inner(
            ctx,
            question,
            answer,
            description,
            initial_price,
            categories,
            link,
            ipfs_hash,
        );
        self.guard.exit();
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn create_opinion_inner(
        &mut self,
        ctx: &TxContext,
        question: &str,
        answer: &str,
        description: &str,
        initial_price: u64,
        categories: Vec<String>,
        link: &str,
        ipfs_hash: &str,
    ) -> MarketResult<OpinionId> {
        let limits = &self.config.limits;
        validate_text("question", question, limits.max_question_len, true)?;
        validate_text("answer", answer, limits.max_answer_len, true)?;
        validate_text("description", description, limits.max_description_len, false)?;
        validate_text("link", link, limits.max_link_len, false)?;
        validate_text("ipfs_hash", ipfs_hash, limits.max_link_len, false)?;
        validate_categories(&categories, limits.max_categories)?;

        if !self.calculator.initial_price_in_bounds(initial_price) {
            return Err(MarketError::invalid_input(format!(
                "initial price {} outside [{}, {}]",
                initial_price,
                self.calculator.min_price(),
                self.calculator.max_price()
            )));
        }
        let next_price = self.calculator.next_price(initial_price)?;

        let opinion_id = OpinionId::new(self.next_id);
        let opinion = Opinion {
            id: opinion_id,
            creator: ctx.caller.clone(),
            question_owner: ctx.caller.clone(),
            question: question.to_string(),
            current_answer: answer.to_string(),
            current_answer_description: description.to_string(),
            current_answer_owner: ctx.caller.clone(),
            last_price: initial_price,
            next_price,
            sale_price: None,
            status: OpinionStatus::Active,
            total_volume: initial_price,
            categories,
            link: link.to_string(),
            ipfs_hash: ipfs_hash.to_string(),
            created_at: ctx.now,
        };

        self.ledger.append(
            opinion_id,
            AnswerHistoryEntry {
                answer: answer.to_string(),
                description: description.to_string(),
                owner: ctx.caller.clone(),
                price: initial_price,
                timestamp: ctx.now,
            },
        )?;
        self.opinions.insert(opinion_id, opinion);
        self.next_id += 1;
        self.events.push(MarketEvent::OpinionCreated {
            opinion_id,
            creator: ctx.caller.clone(),
            initial_price,
            timestamp: ctx.now,
        });

        tracing::info!(
            opinion_id = opinion_id.value(),
            caller = %ctx.caller,
            initial_price,
            next_price,
            operation = "create_opinion",
            "opinion created"
        );

        Ok(opinion_id)
    }

    // ============================================================
    // Submission
    // ============================================================

    /// Accept a paid answer against an active opinion.
    ///
    /// `expected_price` is the quote the caller acted on; it is re-validated
    /// against the currently stored required price here, at execution, and a
    /// mismatch is rejected rather than silently adjusted. Payment equals
    /// the required price exactly and is split by the fee manager among the
    /// creator, the previous question owner, and the treasury.
    pub fn submit_answer(
        &mut self,
        ctx: &TxContext,
        vault: &mut AssetVault,
        opinion_id: OpinionId,
        answer: &str,
        description: &str,
        expected_price: u64,
    ) -> MarketResult<()> {
        self.guard.enter()?;
        let result =
            self.submit_answer_inner(ctx, vault, opinion_id, answer, description, expected_price);
        self.guard.exit();
        result
    }

    fn submit_answer_inner(
        &mut self,
        ctx: &TxContext,
        vault: &mut AssetVault,
        opinion_id: OpinionId,
        answer: &str,
        description: &str,
        expected_price: u64,
    ) -> MarketResult<()> {
        // Phase 1: validate against current state, no mutation
        self.validate_submission_text(answer, description)?;
        let quote = self.quote_submission(opinion_id, &ctx.now)?;
        if expected_price != quote.required_price {
            tracing::warn!(
                opinion_id = opinion_id.value(),
                caller = %ctx.caller,
                expected = expected_price,
                current = quote.required_price,
                operation = "submit_answer",
                "stale quote rejected"
            );
            return Err(MarketError::StalePrice {
                expected: expected_price,
                current: quote.required_price,
            });
        }

        let (creator, previous_owner) = {
            let opinion = self.get_opinion(opinion_id)?;
            (opinion.creator.clone(), opinion.question_owner.clone())
        };
        let split = self.fees.distribute(
            &self.roles,
            &AccountId::registry(),
            quote.required_price,
            &creator,
            &previous_owner,
        )?;

        // Phase 2: build and check the full payment plan
        let mut plan = TransferPlan::new();
        for leg in split.legs(&ctx.caller, !ctx.caller.is_protocol()) {
            plan.push(leg);
        }
        vault.check_plan(&plan)?;

        // Phase 3: commit every field together with the history append
        self.ledger.append(
            opinion_id,
            AnswerHistoryEntry {
                answer: answer.to_string(),
                description: description.to_string(),
                owner: ctx.caller.clone(),
                price: quote.required_price,
                timestamp: ctx.now,
            },
        )?;
        let opinion = self
            .opinions
            .get_mut(&opinion_id)
            .ok_or_else(|| MarketError::not_found("Opinion", opinion_id))?;
        opinion.current_answer = answer.to_string();
        opinion.current_answer_description = description.to_string();
        opinion.question_owner = ctx.caller.clone();
        opinion.current_answer_owner = ctx.caller.clone();
        opinion.last_price = quote.required_price;
        opinion.next_price = quote.next_price_after;
        opinion.total_volume += quote.required_price;
        // Ownership moved, so any standing listing from the previous owner
        // is retired
        opinion.sale_price = None;

        self.events.push(MarketEvent::AnswerSubmitted {
            opinion_id,
            owner: ctx.caller.clone(),
            previous_owner,
            price: quote.required_price,
            next_price: quote.next_price_after,
            timestamp: ctx.now,
        });

        tracing::info!(
            opinion_id = opinion_id.value(),
            caller = %ctx.caller,
            amount = quote.required_price,
            next_price = quote.next_price_after,
            operation = "submit_answer",
            "answer accepted"
        );

        // Phase 4: apply the checked plan
        vault.apply_plan(&plan)
    }

    // ============================================================
    // Secondary market
    // ============================================================

    /// List the question for sale at `price`, independent of the price
    /// escalation state
    pub fn list_for_sale(
        &mut self,
        ctx: &TxContext,
        opinion_id: OpinionId,
        price: u64,
    ) -> MarketResult<()> {
        self.guard.enter()?;
        let result = self.list_for_sale_inner(ctx, opinion_id, price);
        self.guard.exit();
        result
    }

    fn list_for_sale_inner(
        &mut self,
        ctx: &TxContext,
        opinion_id: OpinionId,
        price: u64,
    ) -> MarketResult<()> {
        if price == 0 {
            return Err(MarketError::invalid_input("sale price must be positive"));
        }
        let opinion = self.get_opinion(opinion_id)?;
        if !opinion.is_active() {
            return Err(MarketError::Inactive {
                opinion_id: opinion_id.value(),
            });
        }
        require_owner(opinion, &ctx.caller)?;

        let opinion = self
            .opinions
            .get_mut(&opinion_id)
            .ok_or_else(|| MarketError::not_found("Opinion", opinion_id))?;
        opinion.sale_price = Some(price);
        self.events.push(MarketEvent::OpinionListed {
            opinion_id,
            seller: ctx.caller.clone(),
            price,
            timestamp: ctx.now,
        });

        tracing::info!(
            opinion_id = opinion_id.value(),
            caller = %ctx.caller,
            amount = price,
            operation = "list_for_sale",
            "opinion listed"
        );
        Ok(())
    }

    /// Retract a standing listing
    pub fn cancel_listing(&mut self, ctx: &TxContext, opinion_id: OpinionId) -> MarketResult<()> {
        self.guard.enter()?;
        let result = self.cancel_listing_inner(ctx, opinion_id);
        self.guard.exit();
        result
    }

    fn cancel_listing_inner(&mut self, ctx: &TxContext, opinion_id: OpinionId) -> MarketResult<()> {
        let opinion = self.get_opinion(opinion_id)?;
        require_owner(opinion, &ctx.caller)?;
        if !opinion.is_listed() {
            return Err(MarketError::invalid_input("no active listing"));
        }

        let opinion = self
            .opinions
            .get_mut(&opinion_id)
            .ok_or_else(|| MarketError::not_found("Opinion", opinion_id))?;
        opinion.sale_price = None;
        self.events.push(MarketEvent::ListingCancelled {
            opinion_id,
            seller: ctx.caller.clone(),
            timestamp: ctx.now,
        });
        Ok(())
    }

    /// Buy a listed question at its listed price, paid to the seller in
    /// full. Transfers ownership only; `last_price`, `next_price`,
    /// `total_volume`, and the answer history are untouched.
    pub fn buy_opinion(
        &mut self,
        ctx: &TxContext,
        vault: &mut AssetVault,
        opinion_id: OpinionId,
        expected_price: u64,
    ) -> MarketResult<()> {
        self.guard.enter()?;
        let result = self.buy_opinion_inner(ctx, vault, opinion_id, expected_price);
        self.guard.exit();
        result
    }

    fn buy_opinion_inner(
        &mut self,
        ctx: &TxContext,
        vault: &mut AssetVault,
        opinion_id: OpinionId,
        expected_price: u64,
    ) -> MarketResult<()> {
        let (seller, listed_price) = {
            let opinion = self.get_opinion(opinion_id)?;
            if !opinion.is_active() {
                return Err(MarketError::Inactive {
                    opinion_id: opinion_id.value(),
                });
            }
            let listed = opinion
                .sale_price
                .ok_or_else(|| MarketError::invalid_input("opinion is not listed for sale"))?;
            (opinion.question_owner.clone(), listed)
        };
        if expected_price != listed_price {
            return Err(MarketError::StalePrice {
                expected: expected_price,
                current: listed_price,
            });
        }
        if ctx.caller == seller {
            return Err(MarketError::invalid_input("cannot buy own listing"));
        }

        let mut plan = TransferPlan::new();
        let leg = if ctx.caller.is_protocol() {
            TransferLeg::direct(ctx.caller.clone(), seller.clone(), listed_price)
        } else {
            TransferLeg::pull(ctx.caller.clone(), seller.clone(), listed_price)
        };
        plan.push(leg);
        vault.check_plan(&plan)?;

        let opinion = self
            .opinions
            .get_mut(&opinion_id)
            .ok_or_else(|| MarketError::not_found("Opinion", opinion_id))?;
        opinion.question_owner = ctx.caller.clone();
        opinion.current_answer_owner = ctx.caller.clone();
        opinion.sale_price = None;
        self.events.push(MarketEvent::OpinionSold {
            opinion_id,
            seller: seller.clone(),
            buyer: ctx.caller.clone(),
            price: listed_price,
            timestamp: ctx.now,
        });

        tracing::info!(
            opinion_id = opinion_id.value(),
            caller = %ctx.caller,
            amount = listed_price,
            operation = "buy_opinion",
            "opinion sold"
        );

        vault.apply_plan(&plan)
    }

    // ============================================================
    // Admin operations
    // ============================================================

    /// Pause an active opinion
    pub fn pause(&mut self, ctx: &TxContext, opinion_id: OpinionId) -> MarketResult<()> {
        self.guard.enter()?;
        let result = self.set_status(ctx, opinion_id, OpinionStatus::Inactive);
        self.guard.exit();
        result
    }

    /// Resume a paused opinion
    pub fn resume(&mut self, ctx: &TxContext, opinion_id: OpinionId) -> MarketResult<()> {
        self.guard.enter()?;
        let result = self.set_status(ctx, opinion_id, OpinionStatus::Active);
        self.guard.exit();
        result
    }

    /// Permanently deactivate an opinion; irreversible
    pub fn delist(&mut self, ctx: &TxContext, opinion_id: OpinionId) -> MarketResult<()> {
        self.guard.enter()?;
        let result = self.set_status(ctx, opinion_id, OpinionStatus::Delisted);
        self.guard.exit();
        result
    }

    fn set_status(
        &mut self,
        ctx: &TxContext,
        opinion_id: OpinionId,
        target: OpinionStatus,
    ) -> MarketResult<()> {
        self.roles.require(&ctx.caller, Role::Admin)?;
        let opinion = self.get_opinion(opinion_id)?;

        // Delisted is terminal
        if opinion.status == OpinionStatus::Delisted {
            return Err(MarketError::Inactive {
                opinion_id: opinion_id.value(),
            });
        }
        match (opinion.status, target) {
            (OpinionStatus::Active, OpinionStatus::Inactive)
            | (OpinionStatus::Inactive, OpinionStatus::Active)
            | (_, OpinionStatus::Delisted) => {}
            (OpinionStatus::Active, OpinionStatus::Active) => {
                return Err(MarketError::invalid_input("opinion is not paused"));
            }
            (OpinionStatus::Inactive, OpinionStatus::Inactive) | (OpinionStatus::Delisted, _) => {
                return Err(MarketError::Inactive {
                    opinion_id: opinion_id.value(),
                });
            }
        }

        let opinion = self
            .opinions
            .get_mut(&opinion_id)
            .ok_or_else(|| MarketError::not_found("Opinion", opinion_id))?;
        opinion.status = target;
        if target == OpinionStatus::Delisted {
            opinion.sale_price = None;
        }
        self.events.push(match target {
            OpinionStatus::Inactive => MarketEvent::OpinionPaused {
                opinion_id,
                timestamp: ctx.now,
            },
            OpinionStatus::Active => MarketEvent::OpinionResumed {
                opinion_id,
                timestamp: ctx.now,
            },
            OpinionStatus::Delisted => MarketEvent::OpinionDelisted {
                opinion_id,
                timestamp: ctx.now,
            },
        });

        tracing::info!(
            opinion_id = opinion_id.value(),
            caller = %ctx.caller,
            status = ?target,
            operation = "set_status",
            "opinion status changed"
        );
        Ok(())
    }

    /// Grant `role` to `account`; admin-gated
    pub fn grant_role(
        &mut self,
        ctx: &TxContext,
        account: AccountId,
        role: Role,
    ) -> MarketResult<()> {
        self.guard.enter()?;
        let result = self
            .roles
            .grant(&ctx.caller, account.clone(), role)
            .map(|()| {
                self.events.push(MarketEvent::RoleGranted {
                    account,
                    role: role.name().to_string(),
                    timestamp: ctx.now,
                });
            });
        self.guard.exit();
        result
    }

    /// Revoke `role` from `account`; admin-gated
    pub fn revoke_role(
        &mut self,
        ctx: &TxContext,
        account: &AccountId,
        role: Role,
    ) -> MarketResult<()> {
        self.guard.enter()?;
        let result = self.roles.revoke(&ctx.caller, account, role).map(|()| {
            self.events.push(MarketEvent::RoleRevoked {
                account: account.clone(),
                role: role.name().to_string(),
                timestamp: ctx.now,
            });
        });
        self.guard.exit();
        result
    }
}

fn require_owner(opinion: &Opinion, caller: &AccountId) -> MarketResult<()> {
    if &opinion.question_owner == caller {
        return Ok(());
    }
    Err(MarketError::Unauthorized {
        caller: caller.to_string(),
        role: "question owner".to_string(),
    })
}

fn validate_text(field: &str, value: &str, max_len: usize, required: bool) -> MarketResult<()> {
    if required && value.trim().is_empty() {
        return Err(MarketError::invalid_input(format!(
            "{} must not be empty",
            field
        )));
    }
    if value.len() > max_len {
        return Err(MarketError::invalid_input(format!(
            "{} exceeds {} bytes",
            field, max_len
        )));
    }
    Ok(())
}

fn validate_categories(categories: &[String], max: usize) -> MarketResult<()> {
    if categories.is_empty() {
        return Err(MarketError::invalid_input("at least one category required"));
    }
    if categories.len() > max {
        return Err(MarketError::invalid_input(format!(
            "at most {} categories allowed",
            max
        )));
    }
    let mut seen = BTreeSet::new();
    for category in categories {
        if category.trim().is_empty() {
            return Err(MarketError::invalid_input("empty category"));
        }
        if !seen.insert(category.as_str()) {
            return Err(MarketError::invalid_input(format!(
                "duplicate category '{}'",
                category
            )));
        }
    }
    Ok(())
}
