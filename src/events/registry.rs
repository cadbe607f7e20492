use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

use super::queue::DeferredQueue;
use super::{Event, Listener, Propagation};
use crate::config::DispatcherConfig;
use crate::scheduler::{Scheduler, TimerHandle, TokioScheduler};
use crate::{DispatchError, SchedulerError};

static DISPATCHER: OnceLock<Dispatcher> = OnceLock::new();

/// Outcome of one notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Listeners processed synchronously.
    pub handled: usize,
    /// Listeners deferred to the drain timer.
    pub queued: usize,
    /// Name of the listener that stopped propagation, if any.
    pub stopped_by: Option<String>,
}

/// Owns the listener registry and the deferred queue.
///
/// Cloning is cheap and every clone drives the same registry. The timer
/// started by [`monitor`](Self::monitor) is cancelled once the last clone is
/// dropped.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    config: DispatcherConfig,
    listeners: RwLock<HashMap<String, Vec<Arc<Listener>>>>,
    queue: DeferredQueue,
    scheduler: Arc<dyn Scheduler>,
    timer: Mutex<Option<TimerHandle>>,
    draining: AtomicBool,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let timer = self.timer.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = timer.take() {
            self.scheduler.cancel(handle);
        }
    }
}

/// Clears the drain flag, also when a handler panics.
struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Dispatcher {
    /// Creates a dispatcher draining its queue through `scheduler`.
    ///
    /// Monitoring starts right away when `config.auto_monitor` is set.
    ///
    /// # Errors
    ///
    /// Returns the scheduler error if monitoring was requested and could not
    /// start.
    pub fn new(
        config: DispatcherConfig,
        scheduler: Arc<dyn Scheduler>,
    ) -> Result<Self, SchedulerError> {
        let dispatcher = Self::unmonitored(config, scheduler);
        if dispatcher.inner.config.auto_monitor {
            dispatcher.monitor()?;
        }
        Ok(dispatcher)
    }

    fn unmonitored(config: DispatcherConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                listeners: RwLock::new(HashMap::new()),
                queue: DeferredQueue::default(),
                scheduler,
                timer: Mutex::new(None),
                draining: AtomicBool::new(false),
            }),
        }
    }

    /// Returns the process-wide dispatcher, creating it on first access.
    ///
    /// The lazily created instance uses the default configuration and a
    /// [`TokioScheduler`], and starts monitoring immediately. Outside a tokio
    /// runtime the timer cannot start: a warning is logged and
    /// [`monitor`](Self::monitor) can be called later from within one.
    pub fn global() -> &'static Dispatcher {
        DISPATCHER.get_or_init(|| {
            let dispatcher =
                Self::unmonitored(DispatcherConfig::default(), Arc::new(TokioScheduler::new()));
            if let Err(e) = dispatcher.monitor() {
                log::warn!(
                    target: "eventide",
                    "msg=\"drain timer not started\", error=\"{e}\""
                );
            }
            dispatcher
        })
    }

    /// Installs `dispatcher` as the process-wide one.
    ///
    /// Call this once during initialization, before anything touches
    /// [`global`](Self::global). Only the first installation takes effect;
    /// later calls log a warning and return `false`.
    pub fn set_global(dispatcher: Dispatcher) -> bool {
        if DISPATCHER.set(dispatcher).is_err() {
            log::warn!(
                target: "eventide",
                "msg=\"global dispatcher already set, ignoring\""
            );
            return false;
        }

        true
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.inner.config
    }

    /// Adds `listener` to the bucket of every event it listens to.
    ///
    /// Buckets keep registration order. No de-duplication happens: a
    /// listener added twice is invoked twice.
    pub fn add_listener(&self, listener: Arc<Listener>) {
        let mut listeners = self
            .inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        for name in listener.listen_to() {
            listeners
                .entry(name.clone())
                .or_default()
                .push(listener.clone());
        }

        log::debug!(
            target: "eventide",
            "msg=\"listener registered\", listener=\"{}\", events=\"{}\", queued={}",
            listener.name(),
            listener.listen_to().join(","),
            listener.should_queue()
        );
    }

    /// Delivers `event` to its listeners in registration order.
    ///
    /// Queued listeners are pushed to the deferred queue and never stop
    /// delivery. Synchronous listeners are processed on the spot; the first
    /// one returning [`Propagation::Stop`] ends the notification, so later
    /// listeners (queued ones included) are not reached.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::NoListener`] if no listener listens to the event
    /// - [`DispatchError::Handler`] if a synchronous handler failed; the
    ///   remaining listeners are skipped and earlier effects are kept
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "notify", skip_all, fields(event = event.name()), err)
    )]
    pub fn notify(&self, event: &Event) -> Result<DispatchReport, DispatchError> {
        // snapshot so handlers can register listeners or fire events
        let bucket = {
            let listeners = self
                .inner
                .listeners
                .read()
                .unwrap_or_else(PoisonError::into_inner);

            match listeners.get(event.name()) {
                Some(bucket) => bucket.clone(),
                None => {
                    return Err(DispatchError::NoListener {
                        event: event.name().to_owned(),
                    });
                }
            }
        };

        let mut report = DispatchReport::default();

        for listener in &bucket {
            if listener.should_queue() {
                self.inner.queue.push(listener.clone(), event.clone());
                report.queued += 1;
                continue;
            }

            report.handled += 1;
            if self.process(listener, event)?.is_stop() {
                log::debug!(
                    target: "eventide",
                    "msg=\"propagation stopped\", event=\"{}\", listener=\"{}\"",
                    event.name(),
                    listener.name()
                );
                report.stopped_by = Some(listener.name().to_owned());
                break;
            }
        }

        Ok(report)
    }

    /// Runs one listener on one event: before-hook, handler, after-hook.
    ///
    /// The after-hook runs even when the handler fails or stops propagation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "process",
            skip_all,
            fields(listener = listener.name(), event = event.name()),
            err
        )
    )]
    pub fn process(&self, listener: &Listener, event: &Event) -> Result<Propagation, DispatchError> {
        listener
            .process(event)
            .map_err(|source| DispatchError::Handler {
                listener: listener.name().to_owned(),
                event: event.name().to_owned(),
                source,
            })
    }

    /// Processes at most one deferred listener.
    ///
    /// Returns `Ok(true)` when an entry was processed, `Ok(false)` when the
    /// queue was empty or another drain is still running.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "drain_tick", skip_all, err)
    )]
    pub fn drain_tick(&self) -> Result<bool, DispatchError> {
        if self
            .inner
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!(target: "eventide", "msg=\"drain already running, skipping tick\"");
            return Ok(false);
        }
        let _guard = DrainGuard(&self.inner.draining);

        let Some(entry) = self.inner.queue.pop() else {
            return Ok(false);
        };

        log::debug!(
            target: "eventide",
            "msg=\"processing deferred listener\", listener=\"{}\", event=\"{}\", queued_at=\"{}\"",
            entry.listener.name(),
            entry.event.name(),
            entry.queued_at
        );

        self.process(&entry.listener, &entry.event)?;
        Ok(true)
    }

    fn drain_on_timer(&self) {
        if let Err(e) = self.drain_tick() {
            log::error!(
                target: "eventide",
                "msg=\"deferred listener failed\", event=\"{}\", error=\"{e}\"",
                e.event()
            );
        }
    }

    /// Starts the recurring drain of the deferred queue.
    ///
    /// Does nothing if monitoring is already running, so there is never more
    /// than one drain timer per dispatcher. A timer that died on its own
    /// (its runtime shut down) is replaced.
    pub fn monitor(&self) -> Result<(), SchedulerError> {
        let mut timer = self
            .inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if self.live_timer(&mut timer) {
            return Ok(());
        }

        let weak = Arc::downgrade(&self.inner);
        let every = self.inner.config.drain_interval;
        let handle = self.inner.scheduler.schedule(
            every,
            Arc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    Dispatcher { inner }.drain_on_timer();
                }
            }),
        )?;
        *timer = Some(handle);

        log::info!(
            target: "eventide",
            "msg=\"monitoring deferred queue\", interval_ms={}",
            every.as_millis()
        );

        Ok(())
    }

    /// Stops the recurring drain. Queued entries stay queued.
    pub fn stop_monitoring(&self) {
        let handle = self
            .inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            self.inner.scheduler.cancel(handle);
            log::info!(target: "eventide", "msg=\"stopped monitoring deferred queue\"");
        }
    }

    pub fn is_monitoring(&self) -> bool {
        let mut timer = self
            .inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        self.live_timer(&mut timer)
    }

    /// Clears `timer` if the scheduler no longer runs it.
    fn live_timer(&self, timer: &mut Option<TimerHandle>) -> bool {
        match *timer {
            Some(handle) if self.inner.scheduler.is_active(handle) => true,
            Some(handle) => {
                log::warn!(
                    target: "eventide",
                    "msg=\"drain timer stopped without being cancelled\", timer={}, queue_len={}",
                    handle.id(),
                    self.inner.queue.len()
                );
                self.inner.scheduler.cancel(handle);
                *timer = None;
                false
            }
            None => false,
        }
    }

    /// Returns how many registrations exist for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event)
            .map_or(0, Vec::len)
    }

    /// Returns every event name with at least one listener, sorted.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Returns the number of deferred entries waiting for a drain tick.
    pub fn queue_len(&self) -> usize {
        self.inner.queue.len()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.inner.config)
            .field("events", &self.event_names())
            .field("queue_len", &self.queue_len())
            .field("monitoring", &self.is_monitoring())
            .finish()
    }
}
