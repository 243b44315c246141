//! Negative rules: predicates no event in a range may satisfy.

use std::fmt;
use std::sync::Arc;

type ExclusionFn<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// A predicate marking an event as disallowed.
///
/// # Example
///
/// ```rust
/// use outcomes::Exclusion;
///
/// #[derive(Debug)]
/// enum Event { Deposited(u32), Withdrawn(u32) }
///
/// let no_large_withdrawals = Exclusion::new(|e: &Event| matches!(e, Event::Withdrawn(n) if *n > 100));
/// assert!(no_large_withdrawals.excludes(&Event::Withdrawn(500)));
/// assert!(!no_large_withdrawals.excludes(&Event::Deposited(500)));
/// ```
pub struct Exclusion<E> {
    predicate: ExclusionFn<E>,
}

impl<E> Exclusion<E> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// Returns true if `event` is disallowed by this predicate.
    pub fn excludes(&self, event: &E) -> bool {
        (self.predicate)(event)
    }
}

impl<E> Clone for Exclusion<E> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<E> fmt::Debug for Exclusion<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exclusion").finish_non_exhaustive()
    }
}

/// Outcome of checking one negative rule over a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegativeMatch {
    Matched,
    /// The published event at this index satisfies an exclusion.
    UnexpectedAt(usize),
}

impl NegativeMatch {
    pub fn is_matched(&self) -> bool {
        matches!(self, NegativeMatch::Matched)
    }
}

/// A set of exclusions; with none, any events are accepted.
#[derive(Debug, Clone)]
pub struct NegativeRule<E> {
    exclusions: Vec<Exclusion<E>>,
}

impl<E> NegativeRule<E> {
    pub fn new(exclusions: impl IntoIterator<Item = Exclusion<E>>) -> Self {
        Self {
            exclusions: exclusions.into_iter().collect(),
        }
    }

    /// A rule accepting any events.
    pub fn any() -> Self {
        Self {
            exclusions: Vec::new(),
        }
    }

    /// Number of exclusion predicates.
    pub fn exclusions(&self) -> usize {
        self.exclusions.len()
    }

    /// Checks that no event in `published[from..to]` is excluded.
    pub fn check_match(&self, published: &[E], from: usize, to: usize) -> NegativeMatch {
        if self.exclusions.is_empty() {
            return NegativeMatch::Matched;
        }
        let to = to.min(published.len());
        (from..to)
            .find(|&index| self.exclusions.iter().any(|x| x.excludes(&published[index])))
            .map_or(NegativeMatch::Matched, NegativeMatch::UnexpectedAt)
    }
}

impl<E> Default for NegativeRule<E> {
    fn default() -> Self {
        Self::any()
    }
}
