use std::fmt;

/// Marker trait for events handled by `outcomes`.
///
/// Events are opaque to the matching engine: they are compared through their
/// [`ComparableEvent`](crate::ComparableEvent) form and inspected only by
/// user-supplied exclusion predicates. They must be `Send + Sync + 'static`
/// because scenarios and adapters cross `.await` points.
///
/// Implemented automatically for every type meeting the bounds.
pub trait Event: fmt::Debug + Send + Sync + 'static {}

impl<T> Event for T where T: fmt::Debug + Send + Sync + 'static {}
