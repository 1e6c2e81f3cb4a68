//! Session timing configuration

use std::time::Duration;

/// Default budget for the first byte of a reply
pub const DEFAULT_ARRIVAL_BUDGET: Duration = Duration::from_secs(1);
/// Default silence that ends a reply
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(100);
/// Default upper bound on draining one reply
pub const DEFAULT_DRAIN_CAP: Duration = Duration::from_secs(5);
/// Default settle time on each side of a raw payload write
pub const DEFAULT_PAYLOAD_SETTLE: Duration = Duration::from_secs(1);

/// How the reader decides a reply is complete once bytes started arriving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStrategy {
    /// Drain whatever is available once and stop
    DrainOnce,
    /// Keep draining until no new byte arrives for the given period
    QuietPeriod(Duration),
}

impl Default for CompletionStrategy {
    fn default() -> Self {
        CompletionStrategy::QuietPeriod(DEFAULT_QUIET_PERIOD)
    }
}

/// Response reader configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Budget for the first byte after a command
    pub arrival_budget: Duration,
    /// When set, waits sleep-and-poll at this interval instead of using the
    /// transport's own readiness wait
    pub poll_interval: Option<Duration>,
    pub completion: CompletionStrategy,
    /// Upper bound on the drain phase of a single reply
    pub drain_cap: Duration,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            arrival_budget: DEFAULT_ARRIVAL_BUDGET,
            poll_interval: None,
            completion: CompletionStrategy::default(),
            drain_cap: DEFAULT_DRAIN_CAP,
        }
    }
}

impl ReaderConfig {
    pub fn with_arrival_budget(mut self, budget: Duration) -> Self {
        self.arrival_budget = budget;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn with_completion(mut self, completion: CompletionStrategy) -> Self {
        self.completion = completion;
        self
    }

    pub fn with_drain_cap(mut self, cap: Duration) -> Self {
        self.drain_cap = cap;
        self
    }
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub reader: ReaderConfig,
    /// Sleep before and after writing a raw payload
    pub payload_settle: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reader: ReaderConfig::default(),
            payload_settle: DEFAULT_PAYLOAD_SETTLE,
        }
    }
}

impl SessionConfig {
    pub fn new(reader: ReaderConfig) -> Self {
        Self {
            reader,
            ..Self::default()
        }
    }

    pub fn with_payload_settle(mut self, settle: Duration) -> Self {
        self.payload_settle = settle;
        self
    }
}
