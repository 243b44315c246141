//! Stable, comparable form of an event.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::{Label, Result};

/// An event reduced to a type tag and canonical content.
///
/// All matching compares `ComparableEvent`s instead of relying on the raw
/// event's own equality. Two values are equal iff both the type tag and the
/// content are equal.
///
/// Canonical content is best-effort: events that differ only in data the
/// serializer skips (e.g. `#[serde(skip)]` fields) produce identical
/// `ComparableEvent`s and therefore compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComparableEvent {
    type_tag: String,
    content: String,
}

impl ComparableEvent {
    pub fn new(type_tag: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            content: content.into(),
        }
    }

    /// Returns the stable identifier of the event's kind.
    #[inline]
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Returns the canonical serialized field values.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl fmt::Display for ComparableEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_tag)
    }
}

/// Strategy turning raw events into [`ComparableEvent`]s.
///
/// Implementations must be deterministic and total over the event types used
/// in a scenario. Errors propagate to the caller and are never reported as
/// match failures.
pub trait Canonicalize<E: ?Sized> {
    fn canonicalize(&self, event: &E) -> Result<ComparableEvent>;

    /// Canonicalizes every event of a slice, preserving order.
    fn canonicalize_all(&self, events: &[E]) -> Result<Vec<ComparableEvent>>
    where
        E: Sized,
    {
        events.iter().map(|e| self.canonicalize(e)).collect()
    }
}

/// Default strategy: [`Label`] as type tag, JSON as content.
///
/// Content goes through [`serde_json::Value`], whose object keys are sorted,
/// so field order never affects equality. For externally tagged enum
/// variants (`{"Deposited":{"amount":10}}`) whose single key equals the
/// label, the wrapper is dropped and only `{"amount":10}` is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCanonicalizer;

impl<E> Canonicalize<E> for JsonCanonicalizer
where
    E: Label + Serialize + ?Sized,
{
    fn canonicalize(&self, event: &E) -> Result<ComparableEvent> {
        let label = event.label();
        let value = match serde_json::to_value(event)? {
            Value::Object(mut map) if map.len() == 1 && map.contains_key(label.as_ref()) => {
                map.remove(label.as_ref()).unwrap_or(Value::Null)
            }
            other => other,
        };
        Ok(ComparableEvent::new(label, serde_json::to_string(&value)?))
    }
}

/// Strategy backed by a plain function or closure.
///
/// Created with [`canonicalize_with`].
#[derive(Clone, Copy)]
pub struct CanonicalizeFn<F>(F);

impl<F> fmt::Debug for CanonicalizeFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanonicalizeFn").finish_non_exhaustive()
    }
}

impl<E, F> Canonicalize<E> for CanonicalizeFn<F>
where
    F: Fn(&E) -> Result<ComparableEvent>,
{
    fn canonicalize(&self, event: &E) -> Result<ComparableEvent> {
        (self.0)(event)
    }
}

/// Wraps a closure as a [`Canonicalize`] strategy.
///
/// ```rust
/// use outcomes::{Canonicalize, ComparableEvent, canonicalize_with};
///
/// let by_debug = canonicalize_with(|n: &u32| Ok(ComparableEvent::new("u32", n.to_string())));
/// assert_eq!(by_debug.canonicalize(&7).unwrap().content(), "7");
/// ```
pub fn canonicalize_with<E, F>(f: F) -> CanonicalizeFn<F>
where
    F: Fn(&E) -> Result<ComparableEvent>,
{
    CanonicalizeFn(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::borrow::Cow;
    use std::collections::HashMap;

    #[derive(Debug, Serialize)]
    enum Sample {
        First { v: i64 },
        Second { v: String },
        Ping,
        Pair { b: u8, a: u8 },
    }

    impl Label for Sample {
        fn label(&self) -> Cow<'static, str> {
            Cow::Borrowed(match self {
                Sample::First { .. } => "First",
                Sample::Second { .. } => "Second",
                Sample::Ping => "Ping",
                Sample::Pair { .. } => "Pair",
            })
        }
    }

    #[derive(Debug, Serialize)]
    struct Renamed {
        v: i64,
    }

    impl Label for Renamed {
        fn label(&self) -> Cow<'static, str> {
            Cow::Borrowed("Renamed")
        }
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("not today"))
        }
    }

    impl Label for Unserializable {
        fn label(&self) -> Cow<'static, str> {
            Cow::Borrowed("Unserializable")
        }
    }

    #[test]
    fn enum_variant_wrapper_is_dropped() {
        let e = JsonCanonicalizer.canonicalize(&Sample::First { v: 1 }).unwrap();
        assert_eq!(e.type_tag(), "First");
        assert_eq!(e.content(), r#"{"v":1}"#);

        let e = JsonCanonicalizer
            .canonicalize(&Sample::Second { v: "abc123".into() })
            .unwrap();
        assert_eq!(e.content(), r#"{"v":"abc123"}"#);
    }

    #[test]
    fn unit_variant_keeps_its_string_form() {
        let e = JsonCanonicalizer.canonicalize(&Sample::Ping).unwrap();
        assert_eq!(e.type_tag(), "Ping");
        assert_eq!(e.content(), r#""Ping""#);
    }

    #[test]
    fn struct_content_is_kept_whole() {
        let e = JsonCanonicalizer.canonicalize(&Renamed { v: 3 }).unwrap();
        assert_eq!(e, ComparableEvent::new("Renamed", r#"{"v":3}"#));
    }

    #[test]
    fn object_keys_are_sorted() {
        let e = JsonCanonicalizer
            .canonicalize(&Sample::Pair { b: 2, a: 1 })
            .unwrap();
        assert_eq!(e.content(), r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn equality_and_hash_are_structural() {
        let a = JsonCanonicalizer.canonicalize(&Sample::First { v: 999 }).unwrap();
        let b = JsonCanonicalizer.canonicalize(&Sample::First { v: 999 }).unwrap();
        let c = JsonCanonicalizer.canonicalize(&Sample::First { v: 998 }).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut counts = HashMap::new();
        *counts.entry(a).or_insert(0) += 1;
        *counts.entry(b).or_insert(0) += 1;
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn same_content_different_tag_differs() {
        assert_ne!(
            ComparableEvent::new("First", r#"{"v":1}"#),
            ComparableEvent::new("Second", r#"{"v":1}"#)
        );
    }

    #[test]
    fn serialization_failure_propagates() {
        let err = JsonCanonicalizer.canonicalize(&Unserializable).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn closure_strategy() {
        let c = canonicalize_with(|s: &&str| Ok(ComparableEvent::new("str", s.to_uppercase())));
        let all = c.canonicalize_all(&["a", "b"]).unwrap();
        assert_eq!(all[1].content(), "B");
    }

    #[test]
    fn display_is_type_tag() {
        assert_eq!(ComparableEvent::new("First", "{}").to_string(), "First");
    }
}
