use std::{borrow::Borrow, fmt, sync::Arc};

use uuid::Uuid;

/// Name of an event stream: the history of one entity under test.
///
/// Backed by a shared `str`, so the copies a scenario hands to the adapter,
/// the executor and the report never reallocate. Equality, hashing and
/// ordering are those of the text, and `Borrow<str>` lets a [`Streams`] map
/// be indexed with a plain `&str`.
///
/// [`Streams`]: crate::Streams
///
/// # Example
///
/// ```rust
/// use outcomes::{StreamId, Streams};
///
/// let mut streams: Streams<u32> = Streams::new();
/// streams.insert("account-1".into(), vec![1, 2]);
/// assert_eq!(streams.get("account-1"), Some(&vec![1, 2]));
///
/// let from_uuid = StreamId::from(uuid::Uuid::nil());
/// assert_eq!(from_uuid, "00000000-0000-0000-0000-000000000000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId(Arc<str>);

impl StreamId {
    pub fn new(id: &str) -> Self {
        Self(Arc::from(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for StreamId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for StreamId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for StreamId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for StreamId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl From<&str> for StreamId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for StreamId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<&StreamId> for StreamId {
    fn from(id: &StreamId) -> Self {
        id.clone()
    }
}

/// Streams keyed by aggregate id use the hyphenated form.
impl From<Uuid> for StreamId {
    fn from(id: Uuid) -> Self {
        Self::from(id.hyphenated().to_string())
    }
}

impl From<StreamId> for String {
    fn from(id: StreamId) -> Self {
        id.0.to_string()
    }
}
