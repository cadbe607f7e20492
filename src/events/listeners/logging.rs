use chrono::Utc;

use crate::events::{Event, HandleResult, Handler, Propagation};

/// Writes one `log` record per handled event.
///
/// The record carries how long the event waited between being fired and
/// being handled, which for queued listeners is the time spent in the
/// deferred queue. Never stops propagation.
///
/// # Example
///
/// ```rust,ignore
/// use eventide::events::listeners::LoggingListener;
/// use eventide::events::{Listener, ListenerConfig};
///
/// Listener::builder(ListenerConfig::new("event-log", ["order.placed"]).queued())
///     .handler(LoggingListener::named("order-audit").at(log::Level::Debug))
///     .register_global()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingListener {
    label: Option<String>,
    level: log::Level,
}

impl LoggingListener {
    /// Logs at INFO level without a label.
    pub fn new() -> Self {
        Self {
            label: None,
            level: log::Level::Info,
        }
    }

    /// Logs at INFO level, tagging each record with `label`.
    pub fn named(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::new()
        }
    }

    #[must_use]
    pub fn at(mut self, level: log::Level) -> Self {
        self.level = level;
        self
    }

    fn render(&self, event: &Event) -> String {
        let waited_ms = (Utc::now() - event.occurred_at()).num_milliseconds().max(0);

        format!(
            "msg=\"event handled\", listener=\"{}\", event=\"{}\", payload={}, waited_ms={waited_ms}",
            self.label.as_deref().unwrap_or("-"),
            event.name(),
            event.has_payload()
        )
    }
}

impl Default for LoggingListener {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for LoggingListener {
    fn handle(&self, event: &Event) -> HandleResult {
        log::log!(target: "eventide::events", self.level, "{}", self.render(event));

        Ok(Propagation::Continue)
    }
}
