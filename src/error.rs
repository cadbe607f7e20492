use std::fmt;

pub use crate::validators::ConfigurationError;

/// Error type returned by listener handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while notifying listeners or draining the deferred queue.
#[derive(Debug)]
pub enum DispatchError {
    /// No listener is registered for the fired event.
    NoListener { event: String },
    /// A listener's handler failed. Listeners processed before it keep
    /// their effects.
    Handler {
        listener: String,
        event: String,
        source: HandlerError,
    },
}

impl DispatchError {
    /// Returns the name of the event involved in the failure.
    pub fn event(&self) -> &str {
        match self {
            Self::NoListener { event } | Self::Handler { event, .. } => event,
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoListener { event } => write!(
                f,
                "There is no event listener registered for the event named {event}"
            ),
            Self::Handler {
                listener,
                event,
                source,
            } => write!(
                f,
                "Listener '{listener}' failed to handle event {event}: {source}"
            ),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NoListener { .. } => None,
            Self::Handler { source, .. } => Some(source.as_ref()),
        }
    }
}

/// Errors raised by a [`Scheduler`](crate::scheduler::Scheduler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The scheduler needs a tokio runtime and none is reachable.
    NoRuntime,
    /// Timers need a non-zero interval.
    InvalidInterval,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRuntime => write!(f, "No tokio runtime available to drive the timer"),
            Self::InvalidInterval => write!(f, "Timer interval must be greater than zero"),
        }
    }
}

impl std::error::Error for SchedulerError {}
