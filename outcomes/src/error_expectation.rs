//! Expectations about the error returned by a command.

use std::{any::type_name, error::Error as StdError, fmt, sync::Arc};

use regex::Regex;

use crate::{Error, Result};

type ConditionFn<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;
type TypeCheck = fn(&(dyn StdError + 'static)) -> bool;
type DowncastFn = Arc<dyn Fn(&(dyn StdError + 'static)) -> bool + Send + Sync>;

/// How an error message is compared with the expected text.
///
/// `Equals` and `Contains` ignore ASCII and Unicode case. `Regex` is
/// case-sensitive unless the pattern opts out with `(?i)`.
#[derive(Debug, Clone)]
pub enum MessageMatch {
    Equals(String),
    Contains(String),
    Regex(Regex),
}

impl MessageMatch {
    pub fn equals(expected: impl Into<String>) -> Self {
        MessageMatch::Equals(expected.into())
    }

    pub fn contains(expected: impl Into<String>) -> Self {
        MessageMatch::Contains(expected.into())
    }

    /// Match messages against `pattern`.
    ///
    /// Returns [`Error::InvalidPattern`] if `pattern` does not compile.
    pub fn matches_regex(pattern: &str) -> Result<Self> {
        Ok(MessageMatch::Regex(Regex::new(pattern)?))
    }

    /// Returns true if `actual` satisfies this match.
    pub fn is_match(&self, actual: &str) -> bool {
        match self {
            MessageMatch::Equals(expected) => expected.to_lowercase() == actual.to_lowercase(),
            MessageMatch::Contains(expected) => {
                actual.to_lowercase().contains(&expected.to_lowercase())
            }
            MessageMatch::Regex(regex) => regex.is_match(actual),
        }
    }

    pub fn expected(&self) -> &str {
        match self {
            MessageMatch::Equals(expected) | MessageMatch::Contains(expected) => expected,
            MessageMatch::Regex(regex) => regex.as_str(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            MessageMatch::Equals(_) => "Equals",
            MessageMatch::Contains(_) => "Contains",
            MessageMatch::Regex(_) => "MatchesRegex",
        }
    }
}

impl PartialEq for MessageMatch {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.expected() == other.expected()
    }
}

impl Eq for MessageMatch {}

impl From<Regex> for MessageMatch {
    fn from(regex: Regex) -> Self {
        MessageMatch::Regex(regex)
    }
}

enum Kind<E> {
    Message(MessageMatch),
    Condition(ConditionFn<E>),
    Is {
        type_name: &'static str,
        check: TypeCheck,
    },
    CausedBy {
        type_name: &'static str,
        check: TypeCheck,
    },
    IsAnd {
        type_name: &'static str,
        check: TypeCheck,
        predicate: DowncastFn,
    },
}

impl<E> Clone for Kind<E> {
    fn clone(&self) -> Self {
        match self {
            Kind::Message(m) => Kind::Message(m.clone()),
            Kind::Condition(f) => Kind::Condition(Arc::clone(f)),
            Kind::Is { type_name, check } => Kind::Is {
                type_name: *type_name,
                check: *check,
            },
            Kind::CausedBy { type_name, check } => Kind::CausedBy {
                type_name: *type_name,
                check: *check,
            },
            Kind::IsAnd {
                type_name,
                check,
                predicate,
            } => Kind::IsAnd {
                type_name: *type_name,
                check: *check,
                predicate: Arc::clone(predicate),
            },
        }
    }
}

/// An assertion over the error returned by a dispatched command.
///
/// `E` is the adapter's [`Error`](crate::Adapter::Error) type.
///
/// # Example
///
/// ```rust
/// use outcomes::{ErrorExpectation, MessageMatch};
///
/// let err = std::io::Error::other("Account is closed");
///
/// let by_text = ErrorExpectation::message(MessageMatch::contains("CLOSED"));
/// assert!(by_text.check(&err).is_ok());
///
/// let by_type = ErrorExpectation::<std::io::Error>::is::<std::fmt::Error>();
/// assert!(by_type.check(&err).is_err());
/// ```
pub struct ErrorExpectation<E> {
    kind: Kind<E>,
}

impl<E> ErrorExpectation<E>
where
    E: StdError + 'static,
{
    /// The error's `Display` text must satisfy `matcher`.
    pub fn message(matcher: MessageMatch) -> Self {
        Self {
            kind: Kind::Message(matcher),
        }
    }

    /// The error must satisfy `predicate`.
    pub fn condition<F>(predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self {
            kind: Kind::Condition(Arc::new(predicate)),
        }
    }

    /// The error itself must be a `T`.
    pub fn is<T: StdError + 'static>() -> Self {
        Self {
            kind: Kind::Is {
                type_name: type_name::<T>(),
                check: is_type::<T>,
            },
        }
    }

    /// The error, or any error in its [`source`](StdError::source) chain,
    /// must be a `T`.
    pub fn caused_by<T: StdError + 'static>() -> Self {
        Self {
            kind: Kind::CausedBy {
                type_name: type_name::<T>(),
                check: is_type::<T>,
            },
        }
    }

    /// The error itself must be a `T` satisfying `predicate`.
    pub fn is_and<T, F>(predicate: F) -> Self
    where
        T: StdError + 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            kind: Kind::IsAnd {
                type_name: type_name::<T>(),
                check: is_type::<T>,
                predicate: Arc::new(move |error: &(dyn StdError + 'static)| {
                    error.downcast_ref::<T>().is_some_and(|typed| predicate(typed))
                }),
            },
        }
    }

    /// Applies the expectation to the returned error.
    ///
    /// Returns [`Error::AssertionFailed`] naming the expected and the actual
    /// error when it does not hold.
    pub fn check(&self, error: &E) -> Result {
        let dyn_error: &(dyn StdError + 'static) = error;

        match &self.kind {
            Kind::Message(matcher) => {
                let actual = error.to_string();
                if matcher.is_match(&actual) {
                    return Ok(());
                }
                Err(Error::AssertionFailed(format!(
                    "Error with unexpected message was returned.\n\
                     Error message assertion of type {} failed.\n\
                     Expected: {}\n\
                     Actual: {actual}\n\
                     Returned error:\n{error:?}",
                    matcher.kind(),
                    matcher.expected(),
                )))
            }
            Kind::Condition(predicate) => {
                if predicate(error) {
                    return Ok(());
                }
                Err(condition_failed(error))
            }
            Kind::Is { type_name, check } => {
                if check(dyn_error) {
                    return Ok(());
                }
                Err(unexpected_type::<E>(type_name))
            }
            Kind::IsAnd {
                type_name,
                check,
                predicate,
            } => {
                if !check(dyn_error) {
                    return Err(unexpected_type::<E>(type_name));
                }
                if predicate(dyn_error) {
                    return Ok(());
                }
                Err(condition_failed(error))
            }
            Kind::CausedBy { type_name, check } => {
                let chain = std::iter::successors(Some(dyn_error), |e| (*e).source());
                if chain.clone().any(check) {
                    return Ok(());
                }
                let causes = chain
                    .map(|e| format!("- {e}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                Err(Error::AssertionFailed(format!(
                    "Returned error was not caused by the expected type.\n\
                     Expected: {type_name}.\n\
                     Error chain:\n{causes}"
                )))
            }
        }
    }
}

fn is_type<T: StdError + 'static>(error: &(dyn StdError + 'static)) -> bool {
    error.is::<T>()
}

fn condition_failed(error: &impl fmt::Debug) -> Error {
    Error::AssertionFailed(format!(
        "Unexpected error was returned. Returned error did not match specified condition.\n\
         Returned error:\n{error:?}"
    ))
}

fn unexpected_type<E>(expected: &str) -> Error {
    Error::AssertionFailed(format!(
        "Error of unexpected type was returned.\n\
         Expected: {expected}.\n\
         Actual: {}.",
        type_name::<E>()
    ))
}

impl<E> Clone for ErrorExpectation<E> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
        }
    }
}

impl<E> fmt::Debug for ErrorExpectation<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Message(m) => f.debug_tuple("Message").field(m).finish(),
            Kind::Condition(_) => f.debug_struct("Condition").finish_non_exhaustive(),
            Kind::Is { type_name, .. } => f.debug_tuple("Is").field(type_name).finish(),
            Kind::CausedBy { type_name, .. } => {
                f.debug_tuple("CausedBy").field(type_name).finish()
            }
            Kind::IsAnd { type_name, .. } => f
                .debug_struct("IsAnd")
                .field("type_name", type_name)
                .finish_non_exhaustive(),
        }
    }
}
