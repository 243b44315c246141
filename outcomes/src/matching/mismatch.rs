use crate::{ComparableEvent, StreamId};

use super::MatchOrder;

/// Where a positive rule failed.
///
/// Ranges are inclusive indices into the published events and start at the
/// cursor, never at an event an earlier rule consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositiveMiss {
    /// Published events ran out before the expected event at this index
    /// (within the rule's expected events) was matched.
    ExpectedNotFound(usize),
    /// The published event at this index does not fit the rule.
    UnexpectedAt(usize),
    /// The rule was searched for after a negative rule and never found.
    SeriesNotFound { from: usize, to: usize },
    /// The last rule matched but events remain after it.
    TrailingEvents { from: usize, to: usize },
}

/// Why a chain was not satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// The chain expected no events, but some were published.
    NoEventsExpected,
    Positive {
        expected: Vec<ComparableEvent>,
        order: MatchOrder,
        miss: PositiveMiss,
    },
    Negative {
        exclusions: usize,
        unexpected_at: usize,
    },
}

impl Mismatch {
    /// Returns the first published index the failure points at, if any.
    ///
    /// [`PositiveMiss::ExpectedNotFound`] points into the expected events
    /// and has no published locus.
    pub fn published_index(&self) -> Option<usize> {
        match self {
            Mismatch::NoEventsExpected => Some(0),
            Mismatch::Negative { unexpected_at, .. } => Some(*unexpected_at),
            Mismatch::Positive { miss, .. } => match miss {
                PositiveMiss::ExpectedNotFound(_) => None,
                PositiveMiss::UnexpectedAt(index) => Some(*index),
                PositiveMiss::SeriesNotFound { from, .. }
                | PositiveMiss::TrailingEvents { from, .. } => Some(*from),
            },
        }
    }
}

/// Result of executing one stream's chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    stream_id: StreamId,
    mismatch: Option<Mismatch>,
    error_message: Option<String>,
}

impl ExecutionResult {
    pub(crate) fn succeeded(stream_id: StreamId) -> Self {
        Self {
            stream_id,
            mismatch: None,
            error_message: None,
        }
    }

    pub(crate) fn failed(stream_id: StreamId, mismatch: Mismatch, error_message: String) -> Self {
        Self {
            stream_id,
            mismatch: Some(mismatch),
            error_message: Some(error_message),
        }
    }

    pub fn stream_id(&self) -> &StreamId {
        &self.stream_id
    }

    pub fn is_succeeded(&self) -> bool {
        self.mismatch.is_none()
    }

    /// The structured failure, if the chain was not satisfied.
    pub fn mismatch(&self) -> Option<&Mismatch> {
        self.mismatch.as_ref()
    }

    /// The rendered diagnostic, if the chain was not satisfied.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}
