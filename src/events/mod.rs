//! Event dispatch: listeners, events and the dispatcher connecting them.
//!
//! Listeners subscribe to event names. Firing an event runs the matching
//! listeners in registration order, either right away or, for queued
//! listeners, on a later tick of the dispatcher's drain timer. A synchronous
//! listener can stop propagation to the listeners registered after it.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use eventide::events::{Event, Listener, ListenerConfig, Propagation};
//!
//! Listener::builder(ListenerConfig::new("welcome-mail", ["user.registered"]))
//!     .handle(|event| {
//!         // send the mail
//!         Ok(Propagation::Continue)
//!     })
//!     .register_global()?;
//!
//! Event::new("user.registered")?.fire()?;
//! ```
//!
//! # Deferred Listeners
//!
//! Listeners built from a [`ListenerConfig::queued`] configuration are
//! never run while notifying. They are queued and handled one per tick by
//! the drain timer (every 5 seconds by default):
//!
//! ```rust,ignore
//! use eventide::events::{Listener, ListenerConfig, Propagation};
//!
//! Listener::builder(ListenerConfig::new("report", ["order.placed"]).queued())
//!     .handle(|event| {
//!         // slow work
//!         Ok(Propagation::Continue)
//!     })
//!     .register_global()?;
//! ```

mod event;
mod listener;
mod queue;
mod registry;

pub mod listeners;

pub use event::Event;
pub use listener::{
    HandleResult, Handler, Hook, Listener, ListenerBuilder, ListenerConfig, Propagation,
};
pub use registry::{DispatchReport, Dispatcher};
