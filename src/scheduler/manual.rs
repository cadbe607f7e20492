use std::collections::BTreeMap;
use std::sync::atomic::AtomicU64;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::{Scheduler, TickFn, TimerHandle, check_interval};
use crate::SchedulerError;

struct Timer {
    every: Duration,
    tick: TickFn,
}

/// A scheduler whose ticks are fired explicitly by the host.
///
/// Useful for hosts that already run their own loop, and for tests that need
/// deterministic drain ticks. The requested interval is recorded but not
/// enforced.
#[derive(Default)]
pub struct ManualScheduler {
    next_id: AtomicU64,
    timers: Mutex<BTreeMap<TimerHandle, Timer>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires every active timer once, in scheduling order.
    ///
    /// Returns the number of callbacks invoked.
    pub fn tick(&self) -> usize {
        // callbacks may schedule or cancel timers, so run them unlocked
        let ticks: Vec<TickFn> = self
            .timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|timer| timer.tick.clone())
            .collect();

        for tick in &ticks {
            tick();
        }

        ticks.len()
    }

    /// Fires every active timer `n` times.
    pub fn tick_n(&self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Returns the number of timers currently scheduled.
    pub fn active_timers(&self) -> usize {
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns the interval a timer was scheduled with.
    pub fn interval(&self, handle: TimerHandle) -> Option<Duration> {
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&handle)
            .map(|timer| timer.every)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, every: Duration, tick: TickFn) -> Result<TimerHandle, SchedulerError> {
        check_interval(every)?;

        let handle = TimerHandle::next(&self.next_id);
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle, Timer { every, tick });

        Ok(handle)
    }

    fn cancel(&self, handle: TimerHandle) {
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle);
    }

    fn is_active(&self, handle: TimerHandle) -> bool {
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&handle)
    }
}
