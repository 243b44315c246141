//! # Outcomes
//!
//! Given/when/then testing for event-sourced systems.
//!
//! A [`Scenario`] seeds history, dispatches commands through an [`Adapter`]
//! and then checks, stream by stream, that the published events satisfy an
//! ordered chain of expectations. On failure the run resolves to
//! [`Error::AssertionFailed`] with a report pinpointing the offending index
//! and dumping every published event.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use outcomes::*;
//!
//! #[derive(Debug, Clone, serde::Serialize)]
//! enum AccountEvent {
//!     Opened { owner: String },
//!     Deposited { amount: i64 },
//!     Withdrawn { amount: i64 },
//! }
//!
//! impl Label for AccountEvent { /* ... */ }
//!
//! #[tokio::test]
//! async fn deposit_after_open() -> Result {
//!     let mut adapter = InMemoryBank::default();
//!
//!     Scenario::for_stream("account-1")
//!         .given([AccountEvent::Opened { owner: "ada".into() }])
//!         .when(Command::Deposit { amount: 10 })
//!         .then_not([Exclusion::new(|e| matches!(e, AccountEvent::Withdrawn { .. }))])
//!         .then(AccountEvent::Deposited { amount: 10 })
//!         .run(&mut adapter)
//!         .await
//! }
//! ```
//!
//! ## Core Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Scenario`] | Fluent description of one test |
//! | [`Adapter`] | Boundary to the system under test |
//! | [`MatchChain`] | Ordered expectation over one stream |
//! | [`ChainExecutor`] | Walks a chain over observed events |
//! | [`ComparableEvent`] | Type tag + canonical content used for equality |
//! | [`ErrorExpectation`] | Assertion over the error a command returned |
//! | [`TesterConfig`] | Timeouts and report layout |
//!
//! ## Expectations
//!
//! ```text
//! then(e) / then_in_order(es)   es exactly at the cursor, in order
//! then_in_any_order(es)         es exactly at the cursor, any permutation
//! then_not(xs)                  until the next positive expectation, nothing matches xs
//! then_any()                    until the next positive expectation, anything goes
//! then_none()                   the stream received no events
//! ```
//!
//! The last positive expectation of a stream must consume every remaining
//! event; end a chain with `then_any()` to tolerate trailing events.
//!
//! See the [`matching`] module for the exact semantics, and
//! `examples/bank.rs` for a complete adapter.

mod adapter;
mod comparable_event;
mod config;
mod error;
mod error_expectation;
mod event;
mod label;
mod scenario;
mod stream_id;
mod tester;
mod verdict;

pub mod matching;

pub use adapter::{Adapter, Streams};
pub use comparable_event::{
    Canonicalize, CanonicalizeFn, ComparableEvent, JsonCanonicalizer, canonicalize_with,
};
pub use config::{DEFAULT_ADAPTER_TIMEOUT, DEFAULT_SEPARATOR_WIDTH, TesterConfig};
pub use error::Error;
pub use error_expectation::{ErrorExpectation, MessageMatch};
pub use event::Event;
pub use label::Label;
pub use matching::{
    ChainExecutor, ExecutionResult, Exclusion, MatchChain, MatchOrder, MatchRule, Mismatch,
    NegativeMatch, NegativeRule, PositiveMatch, PositiveMiss, PositiveRule,
};
pub use scenario::Scenario;
pub use stream_id::StreamId;
pub use tester::Run;
pub use verdict::Verdict;

/// Convenience alias for `Result<T, outcomes::Error>`.
pub type Result<T = ()> = std::result::Result<T, Error>;
