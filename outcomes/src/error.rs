use std::{sync::Arc, time::Duration};

/// The single error type for all `outcomes` operations.
///
/// Variants fall into three groups:
///
/// - **construction errors** ([`is_construction`](Self::is_construction)): the
///   scenario or chain itself is malformed. These indicate a bug in the test,
///   not in the system under test.
/// - **assertion failures** ([`AssertionFailed`](Self::AssertionFailed)): the
///   scenario is well formed but the observed behavior does not satisfy it.
///   The message carries the full diagnostic.
/// - **infrastructure faults**: serialization, adapter and timeout errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("Cannot set None if there are other rules defined.")]
    NoneWithRules,

    #[error("Cannot add any rule if None is set.")]
    RuleAfterNone,

    #[error("Cannot add two consecutive negative rules (then_any or then_not).")]
    ConsecutiveNegativeRules,

    #[error("Cannot assert without at least one rule defined.")]
    EmptyChain,

    #[error("Expected events collection is empty.")]
    EmptyExpectedEvents,

    #[error(
        "Scenario was created with Scenario::for_many(), pass a stream id to {0}_on(...) \
         or create the scenario with Scenario::for_stream(stream_id)."
    )]
    MissingStreamId(&'static str),

    #[error("Invalid error message pattern: {0}")]
    InvalidPattern(#[source] regex::Error),

    #[error("\n{0}")]
    AssertionFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[source] Arc<serde_json::Error>),

    #[error("Adapter error: {0}")]
    Adapter(#[source] Arc<dyn std::error::Error + Send + Sync>),

    #[error("Adapter did not complete {0} within {1:?}")]
    AdapterTimeout(&'static str, Duration),
}

impl Error {
    pub fn adapter(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Adapter(Arc::new(e))
    }

    /// Returns true if the error signals a malformed scenario or chain.
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Error::NoneWithRules
                | Error::RuleAfterNone
                | Error::ConsecutiveNegativeRules
                | Error::EmptyChain
                | Error::EmptyExpectedEvents
                | Error::MissingStreamId(_)
                | Error::InvalidPattern(_)
        )
    }

    /// Returns true if the observed behavior did not satisfy the scenario.
    pub fn is_assertion(&self) -> bool {
        matches!(self, Error::AssertionFailed(_))
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NoneWithRules, Self::NoneWithRules) => true,
            (Self::RuleAfterNone, Self::RuleAfterNone) => true,
            (Self::ConsecutiveNegativeRules, Self::ConsecutiveNegativeRules) => true,
            (Self::EmptyChain, Self::EmptyChain) => true,
            (Self::EmptyExpectedEvents, Self::EmptyExpectedEvents) => true,
            (Self::MissingStreamId(a), Self::MissingStreamId(b)) => a == b,
            (Self::InvalidPattern(a), Self::InvalidPattern(b)) => a == b,
            (Self::AssertionFailed(a), Self::AssertionFailed(b)) => a == b,
            (Self::Serialization(a), Self::Serialization(b)) => Arc::ptr_eq(a, b),
            (Self::Adapter(a), Self::Adapter(b)) => Arc::ptr_eq(a, b),
            (Self::AdapterTimeout(a1, a2), Self::AdapterTimeout(b1, b2)) => a1 == b1 && a2 == b2,
            _ => false,
        }
    }
}

impl Eq for Error {}

impl From<regex::Error> for Error {
    fn from(e: regex::Error) -> Self {
        Error::InvalidPattern(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(Arc::new(e))
    }
}
