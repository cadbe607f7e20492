//! Periodic scheduling used to drain the deferred queue.
//!
//! The dispatcher only needs two operations from its host: schedule a
//! callback at a fixed interval, and cancel it. [`TokioScheduler`] runs each
//! timer as a tokio task; [`ManualScheduler`] lets the host (or a test) fire
//! ticks by hand.

mod manual;
mod runtime;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::SchedulerError;

pub use manual::ManualScheduler;
pub use runtime::TokioScheduler;

/// Callback invoked on every tick.
pub type TickFn = Arc<dyn Fn() + Send + Sync + 'static>;

/// Opaque reference to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub(crate) fn next(counter: &AtomicU64) -> Self {
        Self(counter.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the numeric id of this timer.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A capability that invokes a callback at a fixed interval.
pub trait Scheduler: Send + Sync + 'static {
    /// Registers `tick` to be called every `every`, first call one full
    /// interval from now.
    fn schedule(&self, every: Duration, tick: TickFn) -> Result<TimerHandle, SchedulerError>;

    /// Cancels a timer. Unknown or already cancelled handles are ignored.
    fn cancel(&self, handle: TimerHandle);

    /// Returns whether the timer is still going to tick.
    ///
    /// A timer can die without being cancelled, e.g. when the runtime
    /// driving it shuts down.
    fn is_active(&self, handle: TimerHandle) -> bool;
}

pub(crate) fn check_interval(every: Duration) -> Result<(), SchedulerError> {
    if every.is_zero() {
        return Err(SchedulerError::InvalidInterval);
    }

    Ok(())
}
