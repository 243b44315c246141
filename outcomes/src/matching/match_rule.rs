use super::{NegativeRule, PositiveRule};

/// One step of a [`MatchChain`](super::MatchChain).
#[derive(Debug, Clone)]
pub enum MatchRule<E> {
    Positive(PositiveRule<E>),
    Negative(NegativeRule<E>),
}

impl<E> MatchRule<E> {
    pub fn is_negative(&self) -> bool {
        matches!(self, MatchRule::Negative(_))
    }
}

impl<E> From<PositiveRule<E>> for MatchRule<E> {
    fn from(rule: PositiveRule<E>) -> Self {
        MatchRule::Positive(rule)
    }
}

impl<E> From<NegativeRule<E>> for MatchRule<E> {
    fn from(rule: NegativeRule<E>) -> Self {
        MatchRule::Negative(rule)
    }
}
