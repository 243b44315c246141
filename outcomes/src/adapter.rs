use std::{collections::BTreeMap, future::Future};

use crate::{Event, Result, StreamId};

/// Events grouped by the stream they belong to.
pub type Streams<E> = BTreeMap<StreamId, Vec<E>>;

/// Boundary between a [`Scenario`](crate::Scenario) and the system under test.
///
/// An adapter seeds history, executes commands and reports what was
/// published. The runner drives it through one lifecycle per run:
///
/// ```text
/// before_test -> arrange actions -> set_given_events -> dispatch* -> published_events -> after_test
/// ```
///
/// `after_test` is always called once `before_test` succeeded, even when a
/// later phase fails.
///
/// # Example
///
/// ```rust
/// use outcomes::{Adapter, Result, Streams};
///
/// #[derive(Debug)]
/// struct Rejected;
/// impl std::fmt::Display for Rejected {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         f.write_str("rejected")
///     }
/// }
/// impl std::error::Error for Rejected {}
///
/// #[derive(Default)]
/// struct Counter {
///     history: Streams<u32>,
///     published: Streams<u32>,
///     log: Vec<String>,
/// }
///
/// impl Adapter for Counter {
///     type Event = u32;
///     type Command = (&'static str, u32);
///     type Error = Rejected;
///     type Services = Vec<String>;
///
///     async fn set_given_events(&mut self, streams: &Streams<u32>) -> Result {
///         self.history = streams.clone();
///         Ok(())
///     }
///
///     async fn dispatch(&mut self, (stream, n): Self::Command) -> std::result::Result<(), Rejected> {
///         if n == 0 {
///             return Err(Rejected);
///         }
///         self.published.entry(stream.into()).or_default().push(n);
///         Ok(())
///     }
///
///     async fn published_events(&mut self) -> Result<Streams<u32>> {
///         Ok(std::mem::take(&mut self.published))
///     }
///
///     fn services(&mut self) -> &mut Vec<String> {
///         &mut self.log
///     }
/// }
/// ```
pub trait Adapter: Send {
    /// The event type published by the system under test.
    type Event: Event + Clone;

    /// A command handed to [`dispatch`](Self::dispatch).
    type Command: Send + 'static;

    /// The error a command may return.
    ///
    /// This is the "returned error" examined by error expectations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Collaborators available to arrange actions and checks.
    type Services: Send + Sync + 'static;

    /// Prepares the system under test for a run.
    fn before_test(&mut self) -> impl Future<Output = Result> + Send {
        async { Ok(()) }
    }

    /// Releases whatever `before_test` acquired.
    fn after_test(&mut self) -> impl Future<Output = Result> + Send {
        async { Ok(()) }
    }

    /// Seeds the history of every stream before commands run.
    fn set_given_events(
        &mut self,
        streams: &Streams<Self::Event>,
    ) -> impl Future<Output = Result> + Send;

    /// Executes one command against the system under test.
    fn dispatch(
        &mut self,
        command: Self::Command,
    ) -> impl Future<Output = std::result::Result<(), Self::Error>> + Send;

    /// Returns the events published since the run started, by stream.
    ///
    /// A stream absent from the map received no events.
    fn published_events(&mut self) -> impl Future<Output = Result<Streams<Self::Event>>> + Send;

    /// Returns the services shared with arrange actions and checks.
    fn services(&mut self) -> &mut Self::Services;
}
