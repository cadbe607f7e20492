pub mod name;
pub mod subscriptions;

pub use name::{validate_event_name, validate_listener_name};
pub use subscriptions::validate_listen_to;

use serde::{Deserialize, Serialize};

/// Raised when a listener or event cannot be constructed.
///
/// Construction never leaves a half-valid object behind, and a listener
/// that fails validation is never registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigurationError {
    MissingHandler { listener: String },
    ListenerNameEmpty,
    NoSubscriptions { listener: String },
    SubscriptionEmpty { listener: String, index: usize },
    EventNameEmpty,
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingHandler { listener } => {
                write!(f, "Listener '{listener}' must provide a handler")
            }
            Self::ListenerNameEmpty => write!(f, "Listener name cannot be empty"),
            Self::NoSubscriptions { listener } => {
                write!(f, "Listener '{listener}' must listen to at least one event")
            }
            Self::SubscriptionEmpty { listener, index } => write!(
                f,
                "Listener '{listener}' has an empty event name at position {index}"
            ),
            Self::EventNameEmpty => write!(f, "Event name cannot be empty"),
        }
    }
}

impl std::error::Error for ConfigurationError {}
