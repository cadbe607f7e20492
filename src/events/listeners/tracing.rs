use chrono::Utc;

use crate::events::{Event, HandleResult, Handler, Propagation};

/// Emits every event it receives as a tracing event.
///
/// Requires the `tracing` feature to be enabled.
///
/// # Example
///
/// ```rust,ignore
/// use eventide::events::listeners::TracingListener;
/// use eventide::events::{Listener, ListenerConfig};
///
/// Listener::builder(ListenerConfig::new("event-trace", ["user.registered"]))
///     .handler(TracingListener)
///     .register_global()?;
/// ```
pub struct TracingListener;

impl Handler for TracingListener {
    fn handle(&self, event: &Event) -> HandleResult {
        tracing::info!(
            target: "eventide::events",
            event_name = event.name(),
            has_payload = event.has_payload(),
            waited_ms = (Utc::now() - event.occurred_at()).num_milliseconds().max(0),
            "event handled"
        );

        Ok(Propagation::Continue)
    }
}
