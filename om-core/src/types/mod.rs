//! Core type definitions

mod common;
mod event;
mod opinion;
mod pool;

pub use common::{
    AccountId, EntryGuard, OpinionId, PoolId, TxContext, BPS_DENOMINATOR, PRICE_DECIMALS,
};
pub use event::MarketEvent;
pub use opinion::{AnswerHistoryEntry, Opinion, OpinionStatus};
pub use pool::{Pool, PoolStatus};
