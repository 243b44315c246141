//! Ordered chain of match rules for one stream.

use crate::{Error, Result};

use super::{Exclusion, MatchOrder, MatchRule, NegativeRule, PositiveRule};

/// An ordered expectation over the events of one stream.
///
/// A chain either expects no events at all ([`set_none`](Self::set_none)) or
/// holds a sequence of rules. Invariants are checked as rules are added:
///
/// - `none` and rules are mutually exclusive;
/// - two negative rules may not be adjacent, since a negative rule is scoped
///   by the positive rule that follows it.
///
/// # Example
///
/// ```rust
/// use outcomes::{Exclusion, MatchChain};
///
/// let mut chain = MatchChain::new();
/// chain.then_not(vec![Exclusion::new(|e: &u32| *e == 0)])?;
/// chain.then_in_order(vec![1, 2])?;
/// assert_eq!(chain.rules().len(), 2);
/// # Ok::<(), outcomes::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct MatchChain<E> {
    pub(super) is_none: bool,
    pub(super) rules: Vec<MatchRule<E>>,
}

impl<E> Default for MatchChain<E> {
    fn default() -> Self {
        Self {
            is_none: false,
            rules: Vec::new(),
        }
    }
}

impl<E> MatchChain<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the chain expects zero events.
    pub fn is_none(&self) -> bool {
        self.is_none
    }

    pub fn rules(&self) -> &[MatchRule<E>] {
        &self.rules
    }

    /// Expect no events at all.
    ///
    /// Returns [`Error::NoneWithRules`] if rules were already added.
    pub fn set_none(&mut self) -> Result {
        if !self.rules.is_empty() {
            return Err(Error::NoneWithRules);
        }
        self.is_none = true;
        Ok(())
    }

    /// Append a rule, enforcing the chain invariants.
    pub fn push(&mut self, rule: impl Into<MatchRule<E>>) -> Result {
        let rule = rule.into();
        if self.is_none {
            return Err(Error::RuleAfterNone);
        }
        if rule.is_negative() && self.rules.last().is_some_and(MatchRule::is_negative) {
            return Err(Error::ConsecutiveNegativeRules);
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn then_in_order(&mut self, expected: Vec<E>) -> Result {
        self.push(PositiveRule::new(expected, MatchOrder::InOrder)?)
    }

    pub fn then_in_any_order(&mut self, expected: Vec<E>) -> Result {
        self.push(PositiveRule::new(expected, MatchOrder::InAnyOrder)?)
    }

    pub fn then_not(&mut self, exclusions: Vec<Exclusion<E>>) -> Result {
        self.push(NegativeRule::new(exclusions))
    }

    pub fn then_any(&mut self) -> Result {
        self.push(NegativeRule::any())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_rejects_rules() {
        let mut chain = MatchChain::<u8>::new();
        chain.set_none().unwrap();
        assert!(chain.is_none());
        assert_eq!(chain.then_in_order(vec![1]), Err(Error::RuleAfterNone));
        assert_eq!(chain.then_any(), Err(Error::RuleAfterNone));
        assert!(chain.rules().is_empty());
    }

    #[test]
    fn rules_reject_none() {
        let mut chain = MatchChain::<u8>::new();
        chain.then_any().unwrap();
        assert_eq!(chain.set_none(), Err(Error::NoneWithRules));
        assert!(!chain.is_none());
    }

    #[test]
    fn adjacent_negative_rules_are_rejected() {
        let mut chain = MatchChain::<u8>::new();
        chain.then_any().unwrap();
        assert_eq!(chain.then_not(vec![]), Err(Error::ConsecutiveNegativeRules));
        assert_eq!(chain.rules().len(), 1);
    }

    #[test]
    fn negative_rules_separated_by_positive_are_fine() {
        let mut chain = MatchChain::<u8>::new();
        chain.then_any().unwrap();
        chain.then_in_any_order(vec![1, 2]).unwrap();
        chain.then_any().unwrap();
        assert_eq!(chain.rules().len(), 3);
    }

    #[test]
    fn empty_positive_rule_is_rejected() {
        let mut chain = MatchChain::<u8>::new();
        assert_eq!(chain.then_in_order(vec![]), Err(Error::EmptyExpectedEvents));
        assert!(chain.rules().is_empty());
    }
}
