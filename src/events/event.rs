use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{DispatchReport, Dispatcher};
use crate::validators::validate_event_name;
use crate::{ConfigurationError, DispatchError};

/// A named occurrence, optionally carrying a payload.
///
/// Events are immutable once built. Cloning is cheap: the payload is shared,
/// which is how queued listeners receive the same event later on.
#[derive(Clone)]
pub struct Event {
    name: Arc<str>,
    payload: Option<Arc<dyn Any + Send + Sync>>,
    occurred_at: DateTime<Utc>,
}

impl Event {
    /// Creates an event without payload.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::EventNameEmpty`] if `name` is empty.
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigurationError> {
        let name = name.into();
        validate_event_name(&name)?;

        Ok(Self {
            name: name.into(),
            payload: None,
            occurred_at: Utc::now(),
        })
    }

    /// Creates an event carrying `payload`.
    ///
    /// Listeners read it back with [`Event::payload`].
    pub fn with_payload<T>(name: impl Into<String>, payload: T) -> Result<Self, ConfigurationError>
    where
        T: Any + Send + Sync,
    {
        let mut event = Self::new(name)?;
        event.payload = Some(Arc::new(payload));
        Ok(event)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the payload if there is one and it is a `T`.
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.as_deref()?.downcast_ref::<T>()
    }

    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Returns the timestamp when this event was created.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Notifies the process-wide dispatcher.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::NoListener`] if nothing listens to this event
    /// - [`DispatchError::Handler`] if a synchronous listener failed
    pub fn fire(&self) -> Result<DispatchReport, DispatchError> {
        self.fire_on(Dispatcher::global())
    }

    /// Notifies the given dispatcher.
    pub fn fire_on(&self, dispatcher: &Dispatcher) -> Result<DispatchReport, DispatchError> {
        dispatcher.notify(self)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("has_payload", &self.has_payload())
            .field("occurred_at", &self.occurred_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct UserRegistered {
        user_id: i64,
    }

    #[test]
    fn test_event_name() {
        let event = Event::new("user.registered").unwrap();

        assert_eq!(event.name(), "user.registered");
        assert!(!event.has_payload());
        assert!(event.payload::<UserRegistered>().is_none());
    }

    #[test]
    fn test_event_name_empty() {
        assert_eq!(Event::new("").unwrap_err(), ConfigurationError::EventNameEmpty);
        assert_eq!(
            Event::with_payload("", 42_u32).unwrap_err(),
            ConfigurationError::EventNameEmpty
        );
    }

    #[test]
    fn test_whitespace_event_name_accepted() {
        let event = Event::new(" ").unwrap();
        assert_eq!(event.name(), " ");
    }

    #[test]
    fn test_event_payload_downcast() {
        let event = Event::with_payload("user.registered", UserRegistered { user_id: 7 }).unwrap();

        assert!(event.has_payload());
        assert_eq!(
            event.payload::<UserRegistered>(),
            Some(&UserRegistered { user_id: 7 })
        );
        assert!(event.payload::<String>().is_none());
    }

    #[test]
    fn test_event_clone_shares_payload() {
        let event = Event::with_payload("ping", String::from("hello")).unwrap();
        let cloned = event.clone();

        assert_eq!(cloned.name(), event.name());
        assert_eq!(cloned.occurred_at(), event.occurred_at());
        assert!(std::ptr::eq(
            event.payload::<String>().unwrap(),
            cloned.payload::<String>().unwrap()
        ));
    }

    #[test]
    fn test_event_debug() {
        let event = Event::with_payload("ping", 1_u8).unwrap();

        let debug_str = format!("{event:?}");
        assert!(debug_str.contains("ping"));
        assert!(debug_str.contains("has_payload: true"));
    }
}
