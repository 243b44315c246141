use std::borrow::Cow;

/// Human-readable label for an event variant.
///
/// The default [`JsonCanonicalizer`](crate::JsonCanonicalizer) uses it as the
/// type tag of a [`ComparableEvent`](crate::ComparableEvent), so two events
/// only compare equal when their labels match. It also names events in
/// diagnostics, e.g. `0. [AccountOpened]`.
///
/// # Example
///
/// ```rust
/// use std::borrow::Cow;
/// use outcomes::Label;
///
/// enum AccountEvent {
///     Opened { owner: String },
///     Closed,
/// }
///
/// impl Label for AccountEvent {
///     fn label(&self) -> Cow<'static, str> {
///         Cow::Borrowed(match self {
///             AccountEvent::Opened { .. } => "Opened",
///             AccountEvent::Closed => "Closed",
///         })
///     }
/// }
///
/// assert_eq!(AccountEvent::Closed.label(), "Closed");
/// ```
pub trait Label {
    /// Returns a human-readable label for this item.
    fn label(&self) -> Cow<'static, str>;
}
