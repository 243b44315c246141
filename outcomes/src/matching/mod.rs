//! The event-sequence matching engine.
//!
//! A [`MatchChain`] describes what one stream must contain; the
//! [`ChainExecutor`] walks it over the observed events with a single
//! advancing cursor and produces an [`ExecutionResult`].
//!
//! ```text
//! then_in_order(A, B)   A and B, exactly at the cursor
//! then_not(p).then(C)   skip to the first C; skipped events must not satisfy p
//! then_any()            anything (or nothing) after the cursor
//! then_none()           no events at all
//! ```

mod chain_executor;
pub mod formatter;
mod match_chain;
mod match_rule;
mod mismatch;
mod negative_rule;
mod positive_rule;

pub use chain_executor::ChainExecutor;
pub use match_chain::MatchChain;
pub use match_rule::MatchRule;
pub use mismatch::{ExecutionResult, Mismatch, PositiveMiss};
pub use negative_rule::{Exclusion, NegativeMatch, NegativeRule};
pub use positive_rule::{MatchOrder, PositiveMatch, PositiveRule};
