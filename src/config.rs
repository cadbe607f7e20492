//! Configuration types for the dispatcher.
//!
//! # Example
//!
//! ```rust
//! use eventide::config::DispatcherConfig;
//! use std::time::Duration;
//!
//! // Use defaults
//! let config = DispatcherConfig::default();
//! assert_eq!(config.drain_interval, Duration::from_secs(5));
//!
//! // Or customize
//! let config = DispatcherConfig {
//!     drain_interval: Duration::from_millis(250),
//!     ..Default::default()
//! };
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default delay between two drain ticks of the deferred queue.
pub const DEFAULT_DRAIN_INTERVAL: Duration = Duration::from_secs(5);

/// Configuration for a [`Dispatcher`](crate::events::Dispatcher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Delay between two drain ticks.
    ///
    /// Each tick processes at most one deferred listener, so a queue of N
    /// entries needs at least N ticks to empty.
    ///
    /// Default: 5 seconds
    pub drain_interval: Duration,

    /// Start the drain timer as soon as the dispatcher is built.
    ///
    /// Default: false. The process-wide dispatcher always starts monitoring.
    pub auto_monitor: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            drain_interval: DEFAULT_DRAIN_INTERVAL,
            auto_monitor: false,
        }
    }
}

impl DispatcherConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration suitable for development.
    ///
    /// Drains once per second and starts monitoring immediately.
    pub fn development() -> Self {
        Self {
            drain_interval: Duration::from_secs(1),
            auto_monitor: true,
        }
    }

    /// Returns a copy with a different drain interval.
    #[must_use]
    pub fn with_drain_interval(mut self, drain_interval: Duration) -> Self {
        self.drain_interval = drain_interval;
        self
    }

    /// Returns a copy that starts monitoring on construction.
    #[must_use]
    pub fn monitored(mut self) -> Self {
        self.auto_monitor = true;
        self
    }
}
