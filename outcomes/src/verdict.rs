/// Outcome of a post-assert check registered with
/// [`Scenario::then_check`](crate::Scenario::then_check).
///
/// `bool` converts into a `Verdict`, so simple checks can return a
/// comparison directly:
///
/// ```rust
/// use outcomes::Verdict;
///
/// let v: Verdict = (2 + 2 == 4).into();
/// assert!(v.is_passed());
///
/// let v = Verdict::failed("balance was 7");
/// assert_eq!(v.message(), Some("balance was 7"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Verdict {
    #[default]
    Passed,
    /// The check failed, optionally explaining why.
    Failed(Option<String>),
}

impl Verdict {
    pub fn failed(message: impl Into<String>) -> Self {
        Verdict::Failed(Some(message.into()))
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Verdict::Passed)
    }

    /// Returns the failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Verdict::Failed(Some(message)) => Some(message),
            _ => None,
        }
    }
}

impl From<bool> for Verdict {
    fn from(passed: bool) -> Self {
        if passed {
            Verdict::Passed
        } else {
            Verdict::Failed(None)
        }
    }
}

impl<E: std::fmt::Display> From<std::result::Result<(), E>> for Verdict {
    fn from(result: std::result::Result<(), E>) -> Self {
        match result {
            Ok(()) => Verdict::Passed,
            Err(e) => Verdict::failed(e.to_string()),
        }
    }
}
