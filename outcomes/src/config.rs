use std::time::Duration;

/// Default bound on every adapter phase.
pub const DEFAULT_ADAPTER_TIMEOUT: Duration = Duration::from_secs(5);

/// Default width of the `-` rule separating streams in a failure report.
pub const DEFAULT_SEPARATOR_WIDTH: usize = 56;

/// Runtime configuration for scenario runs.
///
/// Use the builder pattern to customize, or use [`Default`].
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use outcomes::TesterConfig;
///
/// let config = TesterConfig::default()
///     .with_adapter_timeout(Duration::from_millis(500))  // Fail fast on a hung adapter
///     .with_separator_width(72);                         // Wider report rules
/// assert_eq!(config.separator_width(), 72);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TesterConfig {
    /// Upper bound for each adapter call (`before_test`, `dispatch`, ...).
    /// Default: 5s
    adapter_timeout: Duration,

    /// Width of the separator line in the combined failure report.
    /// Default: 56
    separator_width: usize,
}

impl Default for TesterConfig {
    fn default() -> Self {
        TesterConfig {
            adapter_timeout: DEFAULT_ADAPTER_TIMEOUT,
            separator_width: DEFAULT_SEPARATOR_WIDTH,
        }
    }
}

impl TesterConfig {
    /// Set the upper bound for each adapter call.
    ///
    /// A phase exceeding it fails the run with
    /// [`Error::AdapterTimeout`](crate::Error::AdapterTimeout).
    pub fn with_adapter_timeout(mut self, timeout: Duration) -> Self {
        self.adapter_timeout = timeout;
        self
    }

    /// Returns the upper bound for each adapter call.
    pub fn adapter_timeout(&self) -> Duration {
        self.adapter_timeout
    }

    /// Set the width of the report separator line.
    pub fn with_separator_width(mut self, width: usize) -> Self {
        self.separator_width = width;
        self
    }

    pub fn separator_width(&self) -> usize {
        self.separator_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TesterConfig::default();
        assert_eq!(config.adapter_timeout(), Duration::from_secs(5));
        assert_eq!(config.separator_width(), 56);
    }

    #[test]
    fn builder_overrides() {
        let config = TesterConfig::default()
            .with_adapter_timeout(Duration::from_millis(10))
            .with_separator_width(3);
        assert_eq!(config.adapter_timeout(), Duration::from_millis(10));
        assert_eq!(config.separator_width(), 3);
    }
}
