//! Runs a [`Scenario`] against an [`Adapter`].

use std::{
    fmt,
    future::{Future, IntoFuture},
    pin::Pin,
    time::Duration,
};

use crate::{
    Adapter, Canonicalize, ChainExecutor, Error, ErrorExpectation, ExecutionResult,
    JsonCanonicalizer, MatchChain, Result, Scenario, StreamId, Streams, TesterConfig, Verdict,
    matching::formatter,
    scenario::{ArrangeFn, CheckFn},
};

impl<A: Adapter> Scenario<A> {
    /// Returns a runner executing this scenario against `adapter`.
    ///
    /// The runner is a builder: configure it, then `.await` it.
    ///
    /// ```rust,ignore
    /// scenario
    ///     .run(&mut adapter)
    ///     .within(Duration::from_millis(200))
    ///     .await?;
    /// ```
    pub fn run(self, adapter: &mut A) -> Run<'_, A> {
        Run {
            scenario: self,
            adapter,
            config: TesterConfig::default(),
            executor: ChainExecutor::default(),
        }
    }
}

/// A pending scenario run.
///
/// Created by [`Scenario::run`]. Awaiting it drives the adapter through one
/// lifecycle and resolves to:
///
/// - `Ok(())` when every expectation held;
/// - [`Error::AssertionFailed`] with the full diagnostic when one did not;
/// - a construction, serialization, adapter or timeout error otherwise.
pub struct Run<'a, A: Adapter, C = JsonCanonicalizer> {
    scenario: Scenario<A>,
    adapter: &'a mut A,
    config: TesterConfig,
    executor: ChainExecutor<C>,
}

impl<'a, A: Adapter, C> Run<'a, A, C> {
    /// Override the default 5-second bound on each adapter call.
    pub fn within(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_adapter_timeout(timeout);
        self
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: TesterConfig) -> Self {
        self.config = config;
        self
    }

    /// Compare events through `canonicalizer` instead of the JSON default.
    pub fn canonicalize_with<C2>(self, canonicalizer: C2) -> Run<'a, A, C2> {
        Run {
            scenario: self.scenario,
            adapter: self.adapter,
            config: self.config,
            executor: ChainExecutor::new(canonicalizer),
        }
    }
}

impl<A, C> Run<'_, A, C>
where
    A: Adapter,
    C: Canonicalize<A::Event>,
{
    async fn run(self) -> Result {
        let Run {
            mut scenario,
            adapter,
            config,
            executor,
        } = self;

        if let Some(error) = scenario.error.take() {
            return Err(error);
        }

        tracing::debug!(
            stream = ?scenario.stream_id,
            commands = scenario.commands.len(),
            chains = scenario.chains.len(),
            "running scenario"
        );

        let timeout = config.adapter_timeout();
        bounded("before_test", timeout, adapter.before_test()).await?;

        let outcome = Tester {
            adapter: &mut *adapter,
            config: &config,
            executor: &executor,
        }
        .test(scenario)
        .await;

        let teardown = bounded("after_test", timeout, adapter.after_test()).await;

        match outcome {
            Ok(()) => teardown,
            Err(error) => {
                if let Err(teardown_error) = teardown {
                    tracing::warn!(error = %teardown_error, "after_test failed after an earlier failure");
                }
                Err(error)
            }
        }
    }
}

impl<'a, A, C> IntoFuture for Run<'a, A, C>
where
    A: Adapter + 'a,
    C: Canonicalize<A::Event> + Send + Sync + 'a,
{
    type Output = Result;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + 'a>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.run())
    }
}

impl<A: Adapter, C> fmt::Debug for Run<'_, A, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Run")
            .field("scenario", &self.scenario)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// One lifecycle, between `before_test` and `after_test`.
struct Tester<'r, A, C> {
    adapter: &'r mut A,
    config: &'r TesterConfig,
    executor: &'r ChainExecutor<C>,
}

impl<A, C> Tester<'_, A, C>
where
    A: Adapter,
    C: Canonicalize<A::Event>,
{
    async fn test(&mut self, scenario: Scenario<A>) -> Result {
        let Scenario {
            arrange,
            given,
            commands,
            chains,
            checks,
            error_expectations,
            ..
        } = scenario;

        self.arrange(arrange, &given).await?;
        let returned = self.act(commands).await?;
        self.assert(returned, &chains, &checks, &error_expectations)
            .await
    }

    // ==================== Arrange ====================

    async fn arrange(
        &mut self,
        actions: Vec<ArrangeFn<A::Services>>,
        given: &Streams<A::Event>,
    ) -> Result {
        for action in actions {
            action(self.adapter.services());
        }

        tracing::debug!(streams = given.len(), "seeding given events");
        bounded(
            "set_given_events",
            self.config.adapter_timeout(),
            self.adapter.set_given_events(given),
        )
        .await
    }

    // ==================== Act ====================

    /// Dispatches commands in order, stopping at the first returned error.
    async fn act(&mut self, commands: Vec<A::Command>) -> Result<Option<A::Error>> {
        let timeout = self.config.adapter_timeout();

        for (index, command) in commands.into_iter().enumerate() {
            match tokio::time::timeout(timeout, self.adapter.dispatch(command)).await {
                Ok(Ok(())) => tracing::trace!(command = index, "command dispatched"),
                Ok(Err(error)) => {
                    tracing::debug!(command = index, error = %error, "command returned an error");
                    return Ok(Some(error));
                }
                Err(_) => return Err(timed_out("dispatch", timeout)),
            }
        }

        Ok(None)
    }

    // ==================== Assert ====================

    async fn assert(
        &mut self,
        returned: Option<A::Error>,
        chains: &[(StreamId, MatchChain<A::Event>)],
        checks: &[CheckFn<A::Services>],
        error_expectations: &[ErrorExpectation<A::Error>],
    ) -> Result {
        if error_expectations.is_empty() {
            if let Some(error) = returned {
                return Err(Error::AssertionFailed(format!(
                    "Unexpected error was returned: {error}\n{error:?}"
                )));
            }
            let published = self.published_events().await?;
            self.assert_streams(chains, &published)?;
            return self.assert_checks(checks).await;
        }

        let Some(error) = returned else {
            let published = self.published_events().await?;
            return Err(Error::AssertionFailed(self.no_error_message(&published)?));
        };

        error_expectations
            .iter()
            .try_for_each(|expectation| expectation.check(&error))
    }

    async fn published_events(&mut self) -> Result<Streams<A::Event>> {
        let published = bounded(
            "published_events",
            self.config.adapter_timeout(),
            self.adapter.published_events(),
        )
        .await?;

        tracing::debug!(
            streams = published.len(),
            events = published.values().map(Vec::len).sum::<usize>(),
            "collected published events"
        );
        Ok(published)
    }

    fn assert_streams(
        &self,
        chains: &[(StreamId, MatchChain<A::Event>)],
        published: &Streams<A::Event>,
    ) -> Result {
        let mut results = Vec::with_capacity(chains.len());

        for (stream_id, chain) in chains {
            let observed = published.get(stream_id).map_or(&[][..], Vec::as_slice);
            let result = self.executor.execute(stream_id, chain, observed)?;
            if result.is_succeeded() {
                tracing::debug!(stream = %stream_id, "stream expectations met");
            } else {
                tracing::warn!(
                    stream = %stream_id,
                    events = observed.len(),
                    "stream expectations not met"
                );
            }
            results.push(result);
        }

        if results.iter().all(ExecutionResult::is_succeeded) {
            return Ok(());
        }

        let with_events = published
            .iter()
            .filter(|(_, events)| !events.is_empty())
            .map(|(stream_id, _)| stream_id);

        Err(Error::AssertionFailed(formatter::format_report(
            &results,
            with_events,
            self.config.separator_width(),
        )))
    }

    async fn assert_checks(&mut self, checks: &[CheckFn<A::Services>]) -> Result {
        let timeout = self.config.adapter_timeout();

        for (index, check) in checks.iter().enumerate() {
            let pending = check(&*self.adapter.services());
            let verdict = tokio::time::timeout(timeout, pending)
                .await
                .map_err(|_| timed_out("check", timeout))?;

            if let Verdict::Failed(message) = verdict {
                tracing::debug!(check = index, "check failed");
                let message = match message {
                    Some(message) => format!("Assert check failed. {message}"),
                    None => "Assert check failed.".to_string(),
                };
                return Err(Error::AssertionFailed(message));
            }
        }
        Ok(())
    }

    fn no_error_message(&self, published: &Streams<A::Event>) -> Result<String> {
        let mut message = String::from("Error was expected but no error was returned.");

        let tags = published
            .values()
            .flatten()
            .map(|event| -> Result<String> {
                let comparable = self.executor.canonicalizer().canonicalize(event)?;
                Ok(comparable.type_tag().to_string())
            })
            .collect::<Result<Vec<_>>>()?;

        if !tags.is_empty() {
            message.push_str(&format!(
                " Following events were produced instead: [{}].",
                tags.join(", ")
            ));
        }
        Ok(message)
    }
}

async fn bounded<T>(
    phase: &'static str,
    timeout: Duration,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(timed_out(phase, timeout)),
    }
}

fn timed_out(phase: &'static str, timeout: Duration) -> Error {
    tracing::warn!(phase, ?timeout, "adapter phase timed out");
    Error::AdapterTimeout(phase, timeout)
}
