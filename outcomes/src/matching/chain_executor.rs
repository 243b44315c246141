//! Walks a [`MatchChain`] over the observed events of one stream.

use crate::{Canonicalize, ComparableEvent, Error, JsonCanonicalizer, Result, StreamId};

use super::{
    ExecutionResult, MatchChain, MatchRule, Mismatch, NegativeMatch, NegativeRule, PositiveMatch,
    PositiveMiss, formatter,
    positive_rule::{check_match, check_match_until_found_or_end},
};

/// Executes match chains against observed events.
///
/// The executor is stateless apart from its canonicalization strategy:
/// every call works on its own cursor, so one executor can serve any number
/// of streams, concurrently if needed.
///
/// # Algorithm
///
/// A single cursor advances through the observed events:
///
/// - a positive rule following a positive rule (or first in the chain) must
///   match exactly at the cursor;
/// - a positive rule following a negative rule is searched for from the
///   cursor on; the skipped events are then checked against the negative
///   rule;
/// - a negative rule is evaluated on its own only when it is last, over all
///   remaining events;
/// - a positive rule that is last must leave no events behind.
///
/// # Example
///
/// ```rust
/// use outcomes::{ChainExecutor, MatchChain, StreamId, canonicalize_with, ComparableEvent};
///
/// let executor = ChainExecutor::new(canonicalize_with(|n: &u32| {
///     Ok(ComparableEvent::new("n", n.to_string()))
/// }));
/// let mut chain = MatchChain::new();
/// chain.then_in_order(vec![1, 2])?;
///
/// let result = executor.execute(&StreamId::new("s"), &chain, &[1, 2])?;
/// assert!(result.is_succeeded());
///
/// let result = executor.execute(&StreamId::new("s"), &chain, &[2, 1])?;
/// assert_eq!(result.mismatch().and_then(|m| m.published_index()), Some(0));
/// # Ok::<(), outcomes::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChainExecutor<C = JsonCanonicalizer> {
    canonicalizer: C,
}

impl<C> ChainExecutor<C> {
    pub fn new(canonicalizer: C) -> Self {
        Self { canonicalizer }
    }

    pub fn canonicalizer(&self) -> &C {
        &self.canonicalizer
    }

    /// Executes `chain` against the events observed on `stream_id`.
    ///
    /// Returns `Ok` with a failed [`ExecutionResult`] when the events do not
    /// satisfy the chain. Returns `Err` only for a malformed chain
    /// ([`Error::EmptyChain`], [`Error::ConsecutiveNegativeRules`]) or when
    /// an event cannot be canonicalized. A malformed chain is reported before
    /// any event is canonicalized.
    pub fn execute<E>(
        &self,
        stream_id: &StreamId,
        chain: &MatchChain<E>,
        observed: &[E],
    ) -> Result<ExecutionResult>
    where
        C: Canonicalize<E>,
    {
        validate(chain)?;

        let mut published = Published::new(&self.canonicalizer, observed);
        match self.find_mismatch(stream_id, chain, &mut published)? {
            None => {
                tracing::debug!(stream = %stream_id, events = observed.len(), "chain satisfied");
                Ok(ExecutionResult::succeeded(stream_id.clone()))
            }
            Some(mismatch) => {
                tracing::debug!(
                    stream = %stream_id,
                    events = observed.len(),
                    mismatch = ?mismatch,
                    "chain not satisfied"
                );
                let message = formatter::format_mismatch(stream_id, published.get()?, &mismatch);
                Ok(ExecutionResult::failed(stream_id.clone(), mismatch, message))
            }
        }
    }

    fn find_mismatch<E>(
        &self,
        stream_id: &StreamId,
        chain: &MatchChain<E>,
        published: &mut Published<'_, C, E>,
    ) -> Result<Option<Mismatch>>
    where
        C: Canonicalize<E>,
    {
        let observed = published.observed;
        if chain.is_none() {
            return Ok((!observed.is_empty()).then_some(Mismatch::NoEventsExpected));
        }

        let rules = chain.rules();
        let last = rules.len() - 1;
        let mut pointer = 0;

        for (index, rule) in rules.iter().enumerate() {
            let previous = index.checked_sub(1).map(|p| &rules[p]);

            match rule {
                MatchRule::Positive(positive) => {
                    let expected = positive.comparable(&self.canonicalizer)?;
                    let order = positive.order();
                    let events = published.get()?;

                    let outcome = match previous {
                        Some(MatchRule::Negative(_)) => {
                            check_match_until_found_or_end(&expected, order, events, pointer)
                        }
                        _ => check_match(&expected, order, events, pointer),
                    };

                    let PositiveMatch::Matched { from } = outcome else {
                        let miss = positive_miss(outcome, pointer, observed.len());
                        return Ok(Some(Mismatch::Positive {
                            expected,
                            order,
                            miss,
                        }));
                    };

                    if let Some(MatchRule::Negative(negative)) = previous {
                        if let Some(mismatch) = negative_mismatch(negative, observed, pointer, from)
                        {
                            return Ok(Some(mismatch));
                        }
                    }

                    pointer = from + positive.len();
                    tracing::trace!(
                        stream = %stream_id,
                        rule = index,
                        from,
                        pointer,
                        "positive rule matched"
                    );

                    if index == last && pointer < observed.len() {
                        return Ok(Some(Mismatch::Positive {
                            expected,
                            order,
                            miss: PositiveMiss::TrailingEvents {
                                from: pointer,
                                to: observed.len() - 1,
                            },
                        }));
                    }
                }
                MatchRule::Negative(negative) => {
                    if index == last {
                        if let Some(mismatch) =
                            negative_mismatch(negative, observed, pointer, observed.len())
                        {
                            return Ok(Some(mismatch));
                        }
                        tracing::trace!(stream = %stream_id, rule = index, pointer, "negative rule held");
                    }
                }
            }
        }

        Ok(None)
    }
}

/// Rejects chains no event sequence can be checked against.
fn validate<E>(chain: &MatchChain<E>) -> Result {
    if chain.is_none() {
        return Ok(());
    }
    let rules = chain.rules();
    if rules.is_empty() {
        return Err(Error::EmptyChain);
    }
    if rules
        .windows(2)
        .any(|pair| pair[0].is_negative() && pair[1].is_negative())
    {
        return Err(Error::ConsecutiveNegativeRules);
    }
    Ok(())
}

/// Observed events, canonicalized on first use.
///
/// Only positive rules and rendered diagnostics read the canonical form.
struct Published<'a, C, E> {
    canonicalizer: &'a C,
    observed: &'a [E],
    events: Option<Vec<ComparableEvent>>,
}

impl<'a, C, E> Published<'a, C, E>
where
    C: Canonicalize<E>,
{
    fn new(canonicalizer: &'a C, observed: &'a [E]) -> Self {
        Self {
            canonicalizer,
            observed,
            events: None,
        }
    }

    fn get(&mut self) -> Result<&[ComparableEvent]> {
        if self.events.is_none() {
            self.events = Some(self.canonicalizer.canonicalize_all(self.observed)?);
        }
        Ok(self.events.as_deref().unwrap_or_default())
    }
}

fn negative_mismatch<E>(
    rule: &NegativeRule<E>,
    observed: &[E],
    from: usize,
    to: usize,
) -> Option<Mismatch> {
    match rule.check_match(observed, from, to) {
        NegativeMatch::Matched => None,
        NegativeMatch::UnexpectedAt(unexpected_at) => Some(Mismatch::Negative {
            exclusions: rule.exclusions(),
            unexpected_at,
        }),
    }
}

/// Maps a failed positive outcome to its reported locus.
///
/// A failed search always starts inside the stream: a search from the end
/// reports the first expected event missing instead.
fn positive_miss(outcome: PositiveMatch, pointer: usize, len: usize) -> PositiveMiss {
    match outcome {
        PositiveMatch::ExpectedNotFound(index) => PositiveMiss::ExpectedNotFound(index),
        PositiveMatch::UnexpectedAt(index) => PositiveMiss::UnexpectedAt(index),
        PositiveMatch::SeriesNotFound | PositiveMatch::Matched { .. } => {
            PositiveMiss::SeriesNotFound {
                from: pointer,
                to: len.saturating_sub(1),
            }
        }
    }
}
