//! Fluent given/when/then description of one test.

use std::{fmt, future::Future, pin::Pin};

use crate::{
    Adapter, Error, ErrorExpectation, Exclusion, MatchChain, MessageMatch, Result, StreamId,
    Streams, Verdict,
};

pub(crate) type ArrangeFn<S> = Box<dyn FnOnce(&mut S) + Send>;
pub(crate) type CheckFuture = Pin<Box<dyn Future<Output = Verdict> + Send>>;
pub(crate) type CheckFn<S> = Box<dyn Fn(&S) -> CheckFuture + Send + Sync>;

/// A test case: history, commands, and the expected outcome.
///
/// A scenario is either bound to one stream ([`for_stream`](Self::for_stream))
/// or spans several ([`for_many`](Self::for_many)). Methods without the `_on`
/// suffix target the bound stream; calling them on a `for_many` scenario
/// records [`Error::MissingStreamId`].
///
/// Building never fails eagerly. The first construction error is kept and
/// returned by [`run`](Self::run) before the adapter is touched, so a scenario
/// reads as one uninterrupted chain.
///
/// # Example
///
/// ```rust,ignore
/// Scenario::for_stream("account-1")
///     .given([AccountEvent::Opened { owner: "ada".into() }])
///     .when(Command::Deposit { amount: 10 })
///     .then(AccountEvent::Deposited { amount: 10 })
///     .run(&mut adapter)
///     .await?;
/// ```
pub struct Scenario<A: Adapter> {
    pub(crate) stream_id: Option<StreamId>,
    pub(crate) arrange: Vec<ArrangeFn<A::Services>>,
    pub(crate) given: Streams<A::Event>,
    pub(crate) commands: Vec<A::Command>,
    pub(crate) chains: Vec<(StreamId, MatchChain<A::Event>)>,
    pub(crate) checks: Vec<CheckFn<A::Services>>,
    pub(crate) error_expectations: Vec<ErrorExpectation<A::Error>>,
    pub(crate) error: Option<Error>,
}

impl<A: Adapter> Scenario<A> {
    /// A scenario whose default stream is `stream_id`.
    pub fn for_stream(stream_id: impl Into<StreamId>) -> Self {
        Self::with_stream(Some(stream_id.into()))
    }

    /// A scenario spanning several streams; every stream is named explicitly.
    pub fn for_many() -> Self {
        Self::with_stream(None)
    }

    fn with_stream(stream_id: Option<StreamId>) -> Self {
        Self {
            stream_id,
            arrange: Vec::new(),
            given: Streams::new(),
            commands: Vec::new(),
            chains: Vec::new(),
            checks: Vec::new(),
            error_expectations: Vec::new(),
            error: None,
        }
    }

    /// Returns the default stream, if the scenario has one.
    pub fn stream_id(&self) -> Option<&StreamId> {
        self.stream_id.as_ref()
    }

    /// Returns the first construction error recorded so far.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    // ==================== Given ====================

    /// Append history to the default stream.
    pub fn given(self, events: impl IntoIterator<Item = A::Event>) -> Self {
        self.on_default("given", |s, id| s.given_on(id, events))
    }

    /// Append history to `stream_id`.
    pub fn given_on(
        mut self,
        stream_id: impl Into<StreamId>,
        events: impl IntoIterator<Item = A::Event>,
    ) -> Self {
        self.given
            .entry(stream_id.into())
            .or_default()
            .extend(events);
        self
    }

    /// Prepare the adapter's services before history is seeded.
    pub fn given_with<F>(mut self, action: F) -> Self
    where
        F: FnOnce(&mut A::Services) + Send + 'static,
    {
        self.arrange.push(Box::new(action));
        self
    }

    // ==================== When ====================

    /// Append a command; commands are dispatched in the order given.
    pub fn when(mut self, command: A::Command) -> Self {
        self.commands.push(command);
        self
    }

    // ==================== Then: events ====================

    /// Expect exactly `event` next on the default stream.
    pub fn then(self, event: A::Event) -> Self {
        self.on_default("then", |s, id| s.then_on(id, event))
    }

    pub fn then_on(self, stream_id: impl Into<StreamId>, event: A::Event) -> Self {
        self.then_in_order_on(stream_id, [event])
    }

    /// Expect `events`, contiguous and in order, on the default stream.
    pub fn then_in_order(self, events: impl IntoIterator<Item = A::Event>) -> Self {
        self.on_default("then_in_order", |s, id| s.then_in_order_on(id, events))
    }

    pub fn then_in_order_on(
        self,
        stream_id: impl Into<StreamId>,
        events: impl IntoIterator<Item = A::Event>,
    ) -> Self {
        let events = events.into_iter().collect();
        self.with_chain(stream_id.into(), |chain| chain.then_in_order(events))
    }

    /// Expect `events`, contiguous and in any order, on the default stream.
    pub fn then_in_any_order(self, events: impl IntoIterator<Item = A::Event>) -> Self {
        self.on_default("then_in_any_order", |s, id| {
            s.then_in_any_order_on(id, events)
        })
    }

    pub fn then_in_any_order_on(
        self,
        stream_id: impl Into<StreamId>,
        events: impl IntoIterator<Item = A::Event>,
    ) -> Self {
        let events = events.into_iter().collect();
        self.with_chain(stream_id.into(), |chain| chain.then_in_any_order(events))
    }

    /// Expect that no event up to the next positive expectation (or the end
    /// of the stream) is excluded.
    pub fn then_not(self, exclusions: impl IntoIterator<Item = Exclusion<A::Event>>) -> Self {
        self.on_default("then_not", |s, id| s.then_not_on(id, exclusions))
    }

    pub fn then_not_on(
        self,
        stream_id: impl Into<StreamId>,
        exclusions: impl IntoIterator<Item = Exclusion<A::Event>>,
    ) -> Self {
        let exclusions = exclusions.into_iter().collect();
        self.with_chain(stream_id.into(), |chain| chain.then_not(exclusions))
    }

    /// Accept any events up to the next positive expectation.
    pub fn then_any(self) -> Self {
        self.on_default("then_any", |s, id| s.then_any_on(id))
    }

    pub fn then_any_on(self, stream_id: impl Into<StreamId>) -> Self {
        self.with_chain(stream_id.into(), MatchChain::then_any)
    }

    /// Expect the default stream to receive no events at all.
    pub fn then_none(self) -> Self {
        self.on_default("then_none", |s, id| s.then_none_on(id))
    }

    pub fn then_none_on(self, stream_id: impl Into<StreamId>) -> Self {
        self.with_chain(stream_id.into(), MatchChain::set_none)
    }

    // ==================== Then: checks ====================

    /// Run `check` against the adapter's services after every stream
    /// expectation held.
    pub fn then_check<F, V>(mut self, check: F) -> Self
    where
        F: Fn(&A::Services) -> V + Send + Sync + 'static,
        V: Into<Verdict>,
    {
        self.checks.push(Box::new(move |services: &A::Services| -> CheckFuture {
            let verdict: Verdict = check(services).into();
            Box::pin(std::future::ready(verdict))
        }));
        self
    }

    /// Like [`then_check`](Self::then_check), for checks that have to await.
    ///
    /// The returned future cannot borrow the services; take what it needs
    /// (a cloned handle, a copied value) before the `async` block.
    ///
    /// ```rust,ignore
    /// .then_check_async(|ledger| {
    ///     let store = ledger.store.clone();
    ///     async move { store.count().await == 1 }
    /// })
    /// ```
    pub fn then_check_async<F, Fut, V>(mut self, check: F) -> Self
    where
        F: Fn(&A::Services) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = V> + Send + 'static,
        V: Into<Verdict>,
    {
        self.checks.push(Box::new(move |services: &A::Services| -> CheckFuture {
            let pending = check(services);
            Box::pin(async move {
                let verdict: Verdict = pending.await.into();
                verdict
            })
        }));
        self
    }

    // ==================== Then: errors ====================

    /// Expect a command to return an error satisfying `expectation`.
    ///
    /// Once any error expectation is declared, stream expectations and checks
    /// are not evaluated.
    pub fn then_error(mut self, expectation: ErrorExpectation<A::Error>) -> Self {
        self.error_expectations.push(expectation);
        self
    }

    pub fn then_error_message(self, matcher: MessageMatch) -> Self {
        self.then_error(ErrorExpectation::message(matcher))
    }

    /// Expect the returned error's message to match `pattern`.
    ///
    /// An invalid pattern is recorded as a construction error.
    pub fn then_error_message_matching(self, pattern: &str) -> Self {
        match MessageMatch::matches_regex(pattern) {
            Ok(matcher) => self.then_error_message(matcher),
            Err(e) => self.record(Err(e)),
        }
    }

    pub fn then_error_matching<F>(self, predicate: F) -> Self
    where
        F: Fn(&A::Error) -> bool + Send + Sync + 'static,
    {
        self.then_error(ErrorExpectation::condition(predicate))
    }

    pub fn then_error_is<T: std::error::Error + 'static>(self) -> Self {
        self.then_error(ErrorExpectation::is::<T>())
    }

    /// Expect the returned error to be a `T` satisfying `predicate`.
    pub fn then_error_is_and<T, F>(self, predicate: F) -> Self
    where
        T: std::error::Error + 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.then_error(ErrorExpectation::is_and::<T, F>(predicate))
    }

    pub fn then_error_caused_by<T: std::error::Error + 'static>(self) -> Self {
        self.then_error(ErrorExpectation::caused_by::<T>())
    }

    // ==================== Internals ====================

    fn on_default(self, method: &'static str, f: impl FnOnce(Self, StreamId) -> Self) -> Self {
        match self.stream_id.clone() {
            Some(stream_id) => f(self, stream_id),
            None => self.record(Err(Error::MissingStreamId(method))),
        }
    }

    fn with_chain<F>(mut self, stream_id: StreamId, f: F) -> Self
    where
        F: FnOnce(&mut MatchChain<A::Event>) -> Result,
    {
        let index = match self.chains.iter().position(|(id, _)| *id == stream_id) {
            Some(index) => index,
            None => {
                self.chains.push((stream_id, MatchChain::new()));
                self.chains.len() - 1
            }
        };
        let result = f(&mut self.chains[index].1);
        self.record(result)
    }

    fn record(mut self, result: Result) -> Self {
        if let Err(e) = result {
            tracing::debug!(error = %e, "scenario construction error");
            self.error.get_or_insert(e);
        }
        self
    }
}

impl<A: Adapter> fmt::Debug for Scenario<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("stream_id", &self.stream_id)
            .field("given", &self.given)
            .field("commands", &self.commands.len())
            .field("chains", &self.chains.len())
            .field("checks", &self.checks.len())
            .field("error_expectations", &self.error_expectations)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchRule;

    #[derive(Debug, thiserror::Error)]
    #[error("never")]
    struct Never;

    struct Null(());

    impl Adapter for Null {
        type Event = u32;
        type Command = u32;
        type Error = Never;
        type Services = ();

        async fn set_given_events(&mut self, _: &Streams<u32>) -> Result {
            Ok(())
        }

        async fn dispatch(&mut self, _: u32) -> std::result::Result<(), Never> {
            Ok(())
        }

        async fn published_events(&mut self) -> Result<Streams<u32>> {
            Ok(Streams::new())
        }

        fn services(&mut self) -> &mut () {
            &mut self.0
        }
    }

    type S = Scenario<Null>;

    #[test]
    fn default_stream_methods_target_the_bound_stream() {
        let s = S::for_stream("a")
            .given([1, 2])
            .then(3)
            .then_any()
            .then_in_any_order([4, 5]);

        assert!(s.error().is_none());
        assert_eq!(s.stream_id().map(StreamId::as_str), Some("a"));
        assert_eq!(s.given[&StreamId::new("a")], vec![1, 2]);
        assert_eq!(s.chains.len(), 1);
        assert_eq!(s.chains[0].1.rules().len(), 3);
        assert!(matches!(s.chains[0].1.rules()[1], MatchRule::Negative(_)));
    }

    #[test]
    fn given_appends_per_stream() {
        let s = S::for_many()
            .given_on("a", [1])
            .given_on("b", [2])
            .given_on("a", [3]);
        assert_eq!(s.given[&StreamId::new("a")], vec![1, 3]);
        assert_eq!(s.given[&StreamId::new("b")], vec![2]);
    }

    #[test]
    fn chains_keep_declaration_order() {
        let s = S::for_many()
            .then_on("z", 1)
            .then_none_on("a")
            .then_on("z", 2);
        let ids: Vec<_> = s.chains.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["z", "a"]);
        assert!(s.chains[1].1.is_none());
    }

    #[test]
    fn for_many_requires_stream_ids() {
        let s = S::for_many().given([1]);
        assert_eq!(s.error(), Some(&Error::MissingStreamId("given")));

        let s = S::for_many().then_none();
        assert_eq!(s.error(), Some(&Error::MissingStreamId("then_none")));
    }

    #[test]
    fn first_construction_error_wins() {
        let s = S::for_stream("a")
            .then_none()
            .then(1)
            .then_any()
            .then_in_order([]);
        assert_eq!(s.error(), Some(&Error::RuleAfterNone));
    }

    #[test]
    fn invalid_chains_are_recorded() {
        let s = S::for_stream("a").then_any().then_not([]);
        assert_eq!(s.error(), Some(&Error::ConsecutiveNegativeRules));

        let s = S::for_stream("a").then_in_order([]);
        assert_eq!(s.error(), Some(&Error::EmptyExpectedEvents));

        let s = S::for_stream("a").then(1).then_none();
        assert_eq!(s.error(), Some(&Error::NoneWithRules));
    }

    #[test]
    fn commands_checks_and_expectations_accumulate() {
        let s = S::for_stream("a")
            .when(1)
            .when(2)
            .given_with(|_| {})
            .then_check(|_| true)
            .then_error_message(MessageMatch::equals("never"))
            .then_error_is::<Never>();
        assert_eq!(s.commands, vec![1, 2]);
        assert_eq!(s.arrange.len(), 1);
        assert_eq!(s.checks.len(), 1);
        assert_eq!(s.error_expectations.len(), 2);
        assert!(format!("{s:?}").starts_with("Scenario {"));
    }

    #[test]
    fn error_shortcuts_and_async_checks_accumulate() {
        let s = S::for_stream("a")
            .then_check_async(|_| async { true })
            .then_error_message_matching("^ne+ver$")
            .then_error_is_and::<Never, _>(|_| true);
        assert!(s.error().is_none());
        assert_eq!(s.checks.len(), 1);
        assert_eq!(s.error_expectations.len(), 2);
    }

    #[test]
    fn invalid_message_pattern_is_recorded() {
        let s = S::for_stream("a")
            .then_error_message_matching("(never")
            .then_error_is::<Never>();
        assert!(matches!(s.error(), Some(Error::InvalidPattern(_))));
        assert_eq!(s.error_expectations.len(), 1);
    }
}
