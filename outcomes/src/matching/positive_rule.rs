//! Positive rules: a run of expected events that must appear.

use std::fmt;

use crate::{Canonicalize, ComparableEvent, Error, Result};

/// Ordering policy of a [`PositiveRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchOrder {
    /// Expected events must appear contiguously, in declared order.
    InOrder,
    /// Expected events must appear contiguously, in any permutation.
    InAnyOrder,
}

impl fmt::Display for MatchOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchOrder::InOrder => f.write_str("in specified order"),
            MatchOrder::InAnyOrder => f.write_str("in any order"),
        }
    }
}

/// Outcome of checking one positive rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositiveMatch {
    /// All expected events were found, starting at this published index.
    Matched { from: usize },
    /// The published events ran out; the expected event at this index
    /// (within the rule's expected events) was never matched.
    ExpectedNotFound(usize),
    /// The published event at this index does not fit the rule.
    UnexpectedAt(usize),
    /// No start position produced a match.
    SeriesNotFound,
}

impl PositiveMatch {
    pub fn is_matched(&self) -> bool {
        matches!(self, PositiveMatch::Matched { .. })
    }
}

/// A non-empty run of events expected at the cursor.
#[derive(Debug, Clone)]
pub struct PositiveRule<E> {
    expected: Vec<E>,
    order: MatchOrder,
}

impl<E> PositiveRule<E> {
    /// Create a rule expecting `expected` under the given order policy.
    ///
    /// Returns [`Error::EmptyExpectedEvents`] if `expected` is empty.
    pub fn new(expected: Vec<E>, order: MatchOrder) -> Result<Self> {
        if expected.is_empty() {
            return Err(Error::EmptyExpectedEvents);
        }
        Ok(Self { expected, order })
    }

    pub fn in_order(expected: Vec<E>) -> Result<Self> {
        Self::new(expected, MatchOrder::InOrder)
    }

    pub fn in_any_order(expected: Vec<E>) -> Result<Self> {
        Self::new(expected, MatchOrder::InAnyOrder)
    }

    /// Returns the expected events in declared order.
    pub fn expected(&self) -> &[E] {
        &self.expected
    }

    pub fn order(&self) -> MatchOrder {
        self.order
    }

    /// Number of published events a match consumes.
    pub fn len(&self) -> usize {
        self.expected.len()
    }

    /// Always false: construction rejects empty rules.
    pub fn is_empty(&self) -> bool {
        self.expected.is_empty()
    }

    /// Canonicalizes the expected events.
    pub fn comparable<C>(&self, canonicalizer: &C) -> Result<Vec<ComparableEvent>>
    where
        C: Canonicalize<E>,
    {
        canonicalizer.canonicalize_all(&self.expected)
    }
}

/// Checks `expected` against `published`, anchored exactly at `from`.
///
/// Both slices are already canonicalized; indices in the result are
/// absolute positions in `published` (or in `expected` for
/// [`PositiveMatch::ExpectedNotFound`]).
pub(crate) fn check_match(
    expected: &[ComparableEvent],
    order: MatchOrder,
    published: &[ComparableEvent],
    from: usize,
) -> PositiveMatch {
    match order {
        MatchOrder::InOrder => check_in_order(expected, published, from),
        MatchOrder::InAnyOrder => check_in_any_order(expected, published, from),
    }
}

/// Slides the start position forward from `from` until a match is found.
///
/// With nothing left to search the first expected event is reported
/// missing, exactly as an anchored check past the end would.
pub(crate) fn check_match_until_found_or_end(
    expected: &[ComparableEvent],
    order: MatchOrder,
    published: &[ComparableEvent],
    from: usize,
) -> PositiveMatch {
    if from >= published.len() {
        return PositiveMatch::ExpectedNotFound(0);
    }
    (from..published.len())
        .map(|start| check_match(expected, order, published, start))
        .find(PositiveMatch::is_matched)
        .unwrap_or(PositiveMatch::SeriesNotFound)
}

fn check_in_order(
    expected: &[ComparableEvent],
    published: &[ComparableEvent],
    from: usize,
) -> PositiveMatch {
    let mut next = 0;
    for (index, event) in published.iter().enumerate().skip(from) {
        if *event != expected[next] {
            return PositiveMatch::UnexpectedAt(index);
        }
        next += 1;
        if next == expected.len() {
            return PositiveMatch::Matched { from };
        }
    }
    PositiveMatch::ExpectedNotFound(next)
}

fn check_in_any_order(
    expected: &[ComparableEvent],
    published: &[ComparableEvent],
    from: usize,
) -> PositiveMatch {
    // Multiset of expected events; a published event consumes the
    // lowest-index unconsumed expected event equal to it.
    let mut consumed = vec![false; expected.len()];
    let mut left = expected.len();

    for (index, event) in published.iter().enumerate().skip(from) {
        let slot = expected
            .iter()
            .zip(consumed.iter())
            .position(|(candidate, used)| !used && candidate == event);
        match slot {
            Some(slot) => {
                consumed[slot] = true;
                left -= 1;
                if left == 0 {
                    return PositiveMatch::Matched { from };
                }
            }
            None => return PositiveMatch::UnexpectedAt(index),
        }
    }

    let missing = consumed.iter().position(|used| !used).unwrap_or(0);
    PositiveMatch::ExpectedNotFound(missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(tag: &str, v: &str) -> ComparableEvent {
        ComparableEvent::new(tag, v)
    }

    fn a() -> ComparableEvent {
        ev("A", "1")
    }
    fn b() -> ComparableEvent {
        ev("B", "2")
    }
    fn c() -> ComparableEvent {
        ev("C", "3")
    }
    fn x() -> ComparableEvent {
        ev("X", "0")
    }

    #[test]
    fn empty_rule_is_rejected() {
        let rule = PositiveRule::<u8>::in_order(vec![]);
        assert_eq!(rule.unwrap_err(), Error::EmptyExpectedEvents);
    }

    #[test]
    fn rule_exposes_its_shape() {
        let rule = PositiveRule::in_any_order(vec![1u8, 2]).unwrap();
        assert_eq!(rule.len(), 2);
        assert!(!rule.is_empty());
        assert_eq!(rule.order(), MatchOrder::InAnyOrder);
        assert_eq!(rule.expected(), &[1, 2]);
    }

    // ==================== InOrder ====================

    #[test]
    fn in_order_matches_exact_run() {
        let r = check_match(&[a(), b(), c()], MatchOrder::InOrder, &[a(), b(), c()], 0);
        assert_eq!(r, PositiveMatch::Matched { from: 0 });
    }

    #[test]
    fn in_order_matches_prefix_and_ignores_rest() {
        let r = check_match(&[a(), b()], MatchOrder::InOrder, &[a(), b(), c()], 0);
        assert_eq!(r, PositiveMatch::Matched { from: 0 });
    }

    #[test]
    fn in_order_reports_first_mismatching_published_index() {
        let r = check_match(&[a(), b(), c()], MatchOrder::InOrder, &[c(), a(), b()], 0);
        assert_eq!(r, PositiveMatch::UnexpectedAt(0));

        let r = check_match(&[a(), b(), c()], MatchOrder::InOrder, &[a(), x(), c()], 0);
        assert_eq!(r, PositiveMatch::UnexpectedAt(1));
    }

    #[test]
    fn in_order_reports_absolute_index_when_anchored_later() {
        let r = check_match(&[a(), b()], MatchOrder::InOrder, &[x(), a(), c()], 1);
        assert_eq!(r, PositiveMatch::UnexpectedAt(2));
    }

    #[test]
    fn in_order_reports_first_missing_expected_index() {
        let r = check_match(&[a(), b()], MatchOrder::InOrder, &[a()], 0);
        assert_eq!(r, PositiveMatch::ExpectedNotFound(1));

        let r = check_match(&[a(), b()], MatchOrder::InOrder, &[], 0);
        assert_eq!(r, PositiveMatch::ExpectedNotFound(0));
    }

    #[test]
    fn in_order_anchor_past_end_misses_first_expected() {
        let r = check_match(&[a()], MatchOrder::InOrder, &[a()], 1);
        assert_eq!(r, PositiveMatch::ExpectedNotFound(0));
    }

    // ==================== InAnyOrder ====================

    #[test]
    fn in_any_order_accepts_every_permutation() {
        let expected = [a(), b(), c()];
        let permutations = [
            [a(), b(), c()],
            [a(), c(), b()],
            [b(), a(), c()],
            [b(), c(), a()],
            [c(), a(), b()],
            [c(), b(), a()],
        ];
        for published in permutations {
            let r = check_match(&expected, MatchOrder::InAnyOrder, &published, 0);
            assert!(r.is_matched(), "{published:?}");
            let r = check_match(&expected, MatchOrder::InOrder, &published, 0);
            assert_eq!(r.is_matched(), published == expected, "{published:?}");
        }
    }

    #[test]
    fn in_any_order_uses_multiset_semantics() {
        let expected = [a(), a(), b()];
        let r = check_match(&expected, MatchOrder::InAnyOrder, &[a(), b(), a()], 0);
        assert_eq!(r, PositiveMatch::Matched { from: 0 });

        let r = check_match(&expected, MatchOrder::InAnyOrder, &[a(), b()], 0);
        assert_eq!(r, PositiveMatch::ExpectedNotFound(1));

        let r = check_match(&expected, MatchOrder::InAnyOrder, &[a(), b(), b()], 0);
        assert_eq!(r, PositiveMatch::UnexpectedAt(2));
    }

    #[test]
    fn in_any_order_reports_lowest_missing_expected_index() {
        let expected = [a(), b(), c()];
        let r = check_match(&expected, MatchOrder::InAnyOrder, &[b()], 0);
        assert_eq!(r, PositiveMatch::ExpectedNotFound(0));

        let r = check_match(&expected, MatchOrder::InAnyOrder, &[a()], 0);
        assert_eq!(r, PositiveMatch::ExpectedNotFound(1));
    }

    #[test]
    fn in_any_order_scans_from_anchor() {
        let r = check_match(&[a(), b()], MatchOrder::InAnyOrder, &[x(), b(), a()], 1);
        assert_eq!(r, PositiveMatch::Matched { from: 1 });

        let r = check_match(&[a(), b()], MatchOrder::InAnyOrder, &[a(), x(), b()], 1);
        assert_eq!(r, PositiveMatch::UnexpectedAt(1));
    }

    // ==================== Searching ====================

    #[test]
    fn search_finds_first_matching_start() {
        let published = [x(), x(), a(), b(), a(), b()];
        let r = check_match_until_found_or_end(&[a(), b()], MatchOrder::InOrder, &published, 0);
        assert_eq!(r, PositiveMatch::Matched { from: 2 });

        let r = check_match_until_found_or_end(&[a(), b()], MatchOrder::InOrder, &published, 3);
        assert_eq!(r, PositiveMatch::Matched { from: 4 });
    }

    #[test]
    fn search_supports_any_order() {
        let published = [x(), b(), a()];
        let r =
            check_match_until_found_or_end(&[a(), b()], MatchOrder::InAnyOrder, &published, 0);
        assert_eq!(r, PositiveMatch::Matched { from: 1 });
    }

    #[test]
    fn search_reports_series_not_found() {
        let published = [x(), a(), x()];
        let r = check_match_until_found_or_end(&[a(), b()], MatchOrder::InOrder, &published, 0);
        assert_eq!(r, PositiveMatch::SeriesNotFound);
    }

    #[test]
    fn search_with_nothing_left_misses_first_expected() {
        let r = check_match_until_found_or_end(&[a()], MatchOrder::InOrder, &[], 0);
        assert_eq!(r, PositiveMatch::ExpectedNotFound(0));

        let published = [a(), b()];
        let r =
            check_match_until_found_or_end(&[c()], MatchOrder::InAnyOrder, &published, 2);
        assert_eq!(r, PositiveMatch::ExpectedNotFound(0));
    }
}
