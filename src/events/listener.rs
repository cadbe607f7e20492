use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Dispatcher, Event};
use crate::validators::{validate_listen_to, validate_listener_name};
use crate::{ConfigurationError, HandlerError};

/// Whether delivery should continue after a listener handled an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Propagation {
    #[default]
    Continue,
    /// Skip the remaining listeners of the current notification.
    Stop,
}

impl Propagation {
    pub fn is_stop(self) -> bool {
        self == Self::Stop
    }
}

impl From<bool> for Propagation {
    /// `true` means "stop propagation".
    fn from(stop: bool) -> Self {
        if stop { Self::Stop } else { Self::Continue }
    }
}

/// Result of handling one event.
pub type HandleResult = Result<Propagation, HandlerError>;

/// Handling logic of a listener.
///
/// Handlers run synchronously, either during [`Dispatcher::notify`] or on a
/// drain tick for queued listeners. Closures of the right shape implement
/// this trait.
///
/// # Example
///
/// ```rust,ignore
/// use eventide::events::{Event, HandleResult, Handler, Propagation};
///
/// struct WelcomeMail;
///
/// impl Handler for WelcomeMail {
///     fn handle(&self, event: &Event) -> HandleResult {
///         if let Some(email) = event.payload::<String>() {
///             // send the mail
///         }
///         Ok(Propagation::Continue)
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, event: &Event) -> HandleResult;
}

impl<F> Handler for F
where
    F: Fn(&Event) -> HandleResult + Send + Sync + 'static,
{
    fn handle(&self, event: &Event) -> HandleResult {
        self(event)
    }
}

/// Callback run around a handler.
pub type Hook = Box<dyn Fn(&Event) + Send + Sync + 'static>;

/// Declarative part of a listener.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerConfig {
    pub name: String,
    /// Event names to subscribe to, in order. Must not be empty.
    pub listen_to: Vec<String>,
    /// Defer handling to the drain timer instead of running during notify.
    #[serde(default)]
    pub should_queue: bool,
}

impl ListenerConfig {
    pub fn new<I, S>(name: impl Into<String>, listen_to: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            listen_to: listen_to.into_iter().map(Into::into).collect(),
            should_queue: false,
        }
    }

    /// Returns a copy whose listener is deferred to the drain timer.
    #[must_use]
    pub fn queued(mut self) -> Self {
        self.should_queue = true;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        validate_listener_name(&self.name)?;
        validate_listen_to(&self.name, &self.listen_to)
    }
}

/// A registered subscriber.
///
/// Listeners only exist registered: [`ListenerBuilder::register`] validates
/// the configuration and adds the listener to a dispatcher in one step.
/// They live as long as the dispatcher keeps them.
pub struct Listener {
    name: String,
    listen_to: Vec<String>,
    should_queue: bool,
    handler: Box<dyn Handler>,
    before: Option<Hook>,
    after: Option<Hook>,
    registered_at: DateTime<Utc>,
}

impl Listener {
    pub fn builder(config: ListenerConfig) -> ListenerBuilder {
        ListenerBuilder {
            config,
            handler: None,
            before: None,
            after: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn listen_to(&self) -> &[String] {
        &self.listen_to
    }

    pub fn should_queue(&self) -> bool {
        self.should_queue
    }

    pub fn has_before_hook(&self) -> bool {
        self.before.is_some()
    }

    pub fn has_after_hook(&self) -> bool {
        self.after.is_some()
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Runs before-hook, handler, after-hook.
    ///
    /// The after-hook runs whatever the handler returned.
    pub(crate) fn process(&self, event: &Event) -> HandleResult {
        if let Some(before) = &self.before {
            before(event);
        }

        let result = self.handler.handle(event);

        if let Some(after) = &self.after {
            after(event);
        }

        result
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("name", &self.name)
            .field("listen_to", &self.listen_to)
            .field("should_queue", &self.should_queue)
            .field("has_before_hook", &self.has_before_hook())
            .field("has_after_hook", &self.has_after_hook())
            .finish_non_exhaustive()
    }
}

/// Builds and registers a [`Listener`].
///
/// # Example
///
/// ```rust,ignore
/// use eventide::events::{Listener, ListenerConfig, Propagation};
///
/// let listener = Listener::builder(ListenerConfig::new("audit", ["user.registered"]))
///     .before(|event| log::debug!("about to audit {}", event.name()))
///     .handle(|event| {
///         // write the audit record
///         Ok(Propagation::Continue)
///     })
///     .register(&dispatcher)?;
/// ```
pub struct ListenerBuilder {
    config: ListenerConfig,
    handler: Option<Box<dyn Handler>>,
    before: Option<Hook>,
    after: Option<Hook>,
}

impl ListenerBuilder {
    /// Sets the handler from a [`Handler`] implementation.
    #[must_use]
    pub fn handler(mut self, handler: impl Handler) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Sets the handler from a closure.
    #[must_use]
    pub fn handle<F>(self, handle: F) -> Self
    where
        F: Fn(&Event) -> HandleResult + Send + Sync + 'static,
    {
        self.handler(handle)
    }

    /// Runs `hook` right before the handler.
    #[must_use]
    pub fn before<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.before = Some(Box::new(hook));
        self
    }

    /// Runs `hook` right after the handler, even when it failed or stopped
    /// propagation.
    #[must_use]
    pub fn after<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.after = Some(Box::new(hook));
        self
    }

    /// Validates the listener and registers it on `dispatcher`.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::MissingHandler`] if no handler was set
    /// - [`ConfigurationError::ListenerNameEmpty`] if the name is empty
    /// - [`ConfigurationError::NoSubscriptions`] or
    ///   [`ConfigurationError::SubscriptionEmpty`] for a bad `listen_to`
    ///
    /// Nothing is registered when an error is returned.
    pub fn register(self, dispatcher: &Dispatcher) -> Result<Arc<Listener>, ConfigurationError> {
        let listener = Arc::new(self.build()?);
        dispatcher.add_listener(listener.clone());
        Ok(listener)
    }

    /// Same as [`register`](Self::register) on the process-wide dispatcher.
    pub fn register_global(self) -> Result<Arc<Listener>, ConfigurationError> {
        self.register(Dispatcher::global())
    }

    #[cfg(test)]
    pub(crate) fn build_unregistered(self) -> Result<Listener, ConfigurationError> {
        self.build()
    }

    fn build(self) -> Result<Listener, ConfigurationError> {
        let Some(handler) = self.handler else {
            return Err(ConfigurationError::MissingHandler {
                listener: self.config.name,
            });
        };

        self.config.validate()?;

        let ListenerConfig {
            name,
            listen_to,
            should_queue,
        } = self.config;

        Ok(Listener {
            name,
            listen_to,
            should_queue,
            handler,
            before: self.before,
            after: self.after,
            registered_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn continue_handler(_: &Event) -> HandleResult {
        Ok(Propagation::Continue)
    }

    #[test]
    fn test_propagation_from_bool() {
        assert_eq!(Propagation::from(true), Propagation::Stop);
        assert_eq!(Propagation::from(false), Propagation::Continue);
        assert!(Propagation::Stop.is_stop());
        assert!(!Propagation::default().is_stop());
    }

    #[test]
    fn test_listener_config_new() {
        let config = ListenerConfig::new("audit", ["a", "b"]);

        assert_eq!(config.name, "audit");
        assert_eq!(config.listen_to, vec!["a".to_owned(), "b".to_owned()]);
        assert!(!config.should_queue);
        assert!(config.queued().should_queue);
    }

    #[test]
    fn test_listener_config_deserialize_defaults_queue() {
        let config: ListenerConfig =
            serde_json::from_str(r#"{ "name": "audit", "listen_to": ["ping"] }"#).unwrap();

        assert_eq!(config, ListenerConfig::new("audit", ["ping"]));
    }

    #[test]
    fn test_build_requires_handler() {
        let result = Listener::builder(ListenerConfig::new("audit", ["ping"])).build();

        assert_eq!(
            result.unwrap_err(),
            ConfigurationError::MissingHandler {
                listener: "audit".to_owned()
            }
        );
    }

    #[test]
    fn test_build_validates_config() {
        let result = Listener::builder(ListenerConfig::new("", ["ping"]))
            .handle(continue_handler)
            .build();
        assert_eq!(result.unwrap_err(), ConfigurationError::ListenerNameEmpty);

        let result = Listener::builder(ListenerConfig::new("audit", Vec::<String>::new()))
            .handle(continue_handler)
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigurationError::NoSubscriptions { .. }
        ));

        let result = Listener::builder(ListenerConfig::new("audit", ["ping", ""]))
            .handle(continue_handler)
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigurationError::SubscriptionEmpty { index: 1, .. }
        ));
    }

    #[test]
    fn test_hook_flags() {
        let plain = Listener::builder(ListenerConfig::new("plain", ["ping"]))
            .handle(continue_handler)
            .build()
            .unwrap();
        assert!(!plain.has_before_hook());
        assert!(!plain.has_after_hook());

        let hooked = Listener::builder(ListenerConfig::new("hooked", ["ping"]))
            .before(|_| {})
            .after(|_| {})
            .handle(continue_handler)
            .build()
            .unwrap();
        assert!(hooked.has_before_hook());
        assert!(hooked.has_after_hook());
    }

    #[test]
    fn test_process_runs_hooks_in_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (before, handle, after) = (calls.clone(), calls.clone(), calls.clone());

        let listener = Listener::builder(ListenerConfig::new("hooked", ["ping"]))
            .before(move |_| before.lock().unwrap().push("before"))
            .handle(move |_| {
                handle.lock().unwrap().push("handle");
                Ok(Propagation::Stop)
            })
            .after(move |_| after.lock().unwrap().push("after"))
            .build()
            .unwrap();

        let event = Event::new("ping").unwrap();
        assert_eq!(listener.process(&event).unwrap(), Propagation::Stop);
        assert_eq!(*calls.lock().unwrap(), vec!["before", "handle", "after"]);
    }

    #[test]
    fn test_after_hook_runs_when_handler_fails() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let after = calls.clone();

        let listener = Listener::builder(ListenerConfig::new("failing", ["ping"]))
            .handle(|_| Err("boom".into()))
            .after(move |_| after.lock().unwrap().push("after"))
            .build()
            .unwrap();

        let event = Event::new("ping").unwrap();
        assert_eq!(listener.process(&event).unwrap_err().to_string(), "boom");
        assert_eq!(*calls.lock().unwrap(), vec!["after"]);
    }

    #[test]
    fn test_listener_debug() {
        let listener = Listener::builder(ListenerConfig::new("audit", ["ping"]).queued())
            .handle(continue_handler)
            .build()
            .unwrap();

        let debug_str = format!("{listener:?}");
        assert!(debug_str.contains("audit"));
        assert!(debug_str.contains("should_queue: true"));
    }
}
