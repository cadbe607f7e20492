use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::{Scheduler, TickFn, TimerHandle, check_interval};
use crate::SchedulerError;

/// Runs every timer as a task on a tokio runtime.
///
/// Ticks that fall behind are delayed rather than bursted, so a slow
/// callback never causes back-to-back drains.
pub struct TokioScheduler {
    runtime: Option<Handle>,
    next_id: AtomicU64,
    timers: Mutex<HashMap<TimerHandle, JoinHandle<()>>>,
}

impl TokioScheduler {
    /// Creates a scheduler that spawns on the runtime current at
    /// [`schedule`](Scheduler::schedule) time.
    pub fn new() -> Self {
        Self {
            runtime: None,
            next_id: AtomicU64::new(1),
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a scheduler bound to a specific runtime.
    pub fn with_handle(runtime: Handle) -> Self {
        Self {
            runtime: Some(runtime),
            next_id: AtomicU64::new(1),
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the number of timers currently running.
    ///
    /// Timers whose runtime has shut down are not counted.
    pub fn active_timers(&self) -> usize {
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|task| !task.is_finished())
            .count()
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, every: Duration, tick: TickFn) -> Result<TimerHandle, SchedulerError> {
        check_interval(every)?;

        let runtime = match &self.runtime {
            Some(runtime) => runtime.clone(),
            None => Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?,
        };

        let handle = TimerHandle::next(&self.next_id);
        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                tick();
            }
        });

        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle, task);

        Ok(handle)
    }

    fn cancel(&self, handle: TimerHandle) {
        let task = self
            .timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle);

        if let Some(task) = task {
            task.abort();
        }
    }

    fn is_active(&self, handle: TimerHandle) -> bool {
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&handle)
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        let timers = self.timers.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, task) in timers.drain() {
            task.abort();
        }
    }
}
